//! Selection state machine.
//!
//! A [`Session`] owns the reference points, the active filter, the ranked
//! results and the highlighted facility/route. Every user action is a method
//! returning an [`Effect`] that tells the presentation layer what changed.
//!
//! Geocoding and routing are two-phase: `begin_*` hands out a ticket, the
//! caller awaits the provider, and `complete_*` applies the answer only if the
//! ticket is still current. Geocode tickets go stale when the explicit point
//! changes after they were issued; route tickets go stale when a ranking pass
//! or a newer route request happens first.

use nursemap_core::{
    rank, AgeClass, Bounds, Dataset, Facility, Point, RankedFacility, SearchFilter, SearchRadius,
};

use crate::error::{GeocodeError, GeolocationError, RoutingError, SessionError};
use crate::providers::{Route, TravelMode};

/// What the presentation layer must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A ranking pass replaced the result list; selection and route were cleared.
    Reranked { results: usize },
    /// A route was installed; fit the map to `bounds`.
    RouteReady { bounds: Bounds },
    /// The info overlay was opened or closed.
    SelectionChanged,
    /// Something the user should be told about. State is unchanged.
    Notice(Notice),
    /// A provider answer arrived for a request that has since been superseded.
    Stale,
    Unchanged,
}

/// User-visible failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AddressNotFound { query: String },
    GeocodeFailed { query: String, reason: String },
    RouteUnavailable { facility: String, reason: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::AddressNotFound { query } => {
                write!(f, "address not found: {query}")
            }
            Notice::GeocodeFailed { query, reason } => {
                write!(f, "address search for {query} failed: {reason}")
            }
            Notice::RouteUnavailable { facility, reason } => {
                write!(f, "no walking route to {facility}: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationState {
    Pending,
    Acquired,
    Unavailable,
}

/// An issued address lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeTicket {
    query: String,
    generation: u64,
}

impl GeocodeTicket {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// An issued route request from the active point to a ranked facility.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    facility: Facility,
    origin: Point,
    generation: u64,
}

impl RouteTicket {
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[must_use]
    pub fn destination(&self) -> Point {
        self.facility.position
    }

    #[must_use]
    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    #[must_use]
    pub const fn mode(&self) -> TravelMode {
        TravelMode::Walking
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    filter: SearchFilter,
    home: Option<Point>,
    explicit: Option<Point>,
    geolocation: GeolocationState,
    ranked: Vec<RankedFacility>,
    selected: Option<Facility>,
    route: Option<Route>,
    point_generation: u64,
    route_generation: u64,
}

impl Session {
    #[must_use]
    pub fn new(dataset: Dataset, radius: SearchRadius) -> Self {
        Self {
            dataset,
            filter: SearchFilter {
                age_class: None,
                radius,
            },
            home: None,
            explicit: None,
            geolocation: GeolocationState::Pending,
            ranked: Vec::new(),
            selected: None,
            route: None,
            point_generation: 0,
            route_generation: 0,
        }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    /// Geolocated position, kept as a fallback.
    #[must_use]
    pub fn home(&self) -> Option<Point> {
        self.home
    }

    /// Point set by a map click or address search.
    #[must_use]
    pub fn explicit_point(&self) -> Option<Point> {
        self.explicit
    }

    /// Center used for ranking and routing: the explicit point, else home.
    #[must_use]
    pub fn active_point(&self) -> Option<Point> {
        self.explicit.or(self.home)
    }

    #[must_use]
    pub fn geolocation(&self) -> GeolocationState {
        self.geolocation
    }

    #[must_use]
    pub fn ranked(&self) -> &[RankedFacility] {
        &self.ranked
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Facility> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Device position arrived. Only the first fix is used.
    pub fn geolocation_acquired(&mut self, point: Point) -> Effect {
        if self.geolocation != GeolocationState::Pending {
            tracing::debug!(%point, state = ?self.geolocation, "ignoring late geolocation fix");
            return Effect::Unchanged;
        }
        self.geolocation = GeolocationState::Acquired;
        self.home = Some(point);
        tracing::info!(%point, "home position acquired");

        if self.filter.age_class.is_some() && self.explicit.is_none() {
            self.rerank()
        } else {
            Effect::Unchanged
        }
    }

    /// Device position will never arrive; carry on without a home point.
    pub fn geolocation_unavailable(&mut self, error: &GeolocationError) -> Effect {
        if self.geolocation == GeolocationState::Pending {
            self.geolocation = GeolocationState::Unavailable;
            tracing::info!(error = %error, "proceeding without home position");
        }
        Effect::Unchanged
    }

    /// Change the search radius, re-ranking when an age class is selected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Core`] when `meters` is outside `300..=1500`;
    /// the filter is left unchanged.
    pub fn set_radius(&mut self, meters: u32) -> Result<Effect, SessionError> {
        self.filter.radius = SearchRadius::new(meters)?;
        if self.filter.age_class.is_some() {
            Ok(self.rerank())
        } else {
            Ok(Effect::Unchanged)
        }
    }

    /// Select or clear the age class. Clearing always empties the results.
    pub fn set_age_class(&mut self, age_class: Option<AgeClass>) -> Effect {
        self.filter.age_class = age_class;
        self.rerank()
    }

    /// The user picked a point on the map. Always runs a ranking pass so the
    /// marker moves even without an age class.
    pub fn map_clicked(&mut self, point: Point) -> Effect {
        self.set_explicit(Some(point));
        self.rerank()
    }

    /// Drop the explicit point and rank around home again. No-op until a home
    /// position is known.
    pub fn return_home(&mut self) -> Effect {
        if self.home.is_none() {
            return Effect::Unchanged;
        }
        self.set_explicit(None);
        self.rerank()
    }

    /// Start an address search. Any earlier outstanding search is superseded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyAddress`] for a blank query.
    pub fn begin_geocode(&mut self, query: &str) -> Result<GeocodeTicket, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyAddress);
        }
        self.point_generation += 1;
        Ok(GeocodeTicket {
            query: query.to_string(),
            generation: self.point_generation,
        })
    }

    /// Apply a geocoder answer. A match becomes the explicit point and
    /// triggers a ranking pass; a failure only produces a notice.
    pub fn complete_geocode(
        &mut self,
        ticket: GeocodeTicket,
        outcome: Result<Point, GeocodeError>,
    ) -> Effect {
        if ticket.generation != self.point_generation {
            tracing::debug!(query = %ticket.query, "discarding stale geocode result");
            return Effect::Stale;
        }
        match outcome {
            Ok(point) => {
                tracing::debug!(query = %ticket.query, %point, "address resolved");
                self.set_explicit(Some(point));
                self.rerank()
            }
            Err(GeocodeError::NotFound { .. }) => Effect::Notice(Notice::AddressNotFound {
                query: ticket.query,
            }),
            Err(GeocodeError::Provider(reason)) => {
                tracing::warn!(query = %ticket.query, reason = %reason, "geocoding failed");
                Effect::Notice(Notice::GeocodeFailed {
                    query: ticket.query,
                    reason,
                })
            }
        }
    }

    /// Start a walking-route request to the ranked result at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuchResult`] for an out-of-range index and
    /// [`SessionError::NoOrigin`] when neither an explicit nor a home point
    /// is known.
    pub fn begin_route(&mut self, index: usize) -> Result<RouteTicket, SessionError> {
        let facility = self.ranked_facility(index)?.clone();
        let origin = self.active_point().ok_or(SessionError::NoOrigin)?;
        self.route_generation += 1;
        Ok(RouteTicket {
            facility,
            origin,
            generation: self.route_generation,
        })
    }

    /// Apply a routing answer. Success highlights the facility and installs
    /// the route; failure leaves state untouched and reports a notice.
    pub fn complete_route(
        &mut self,
        ticket: RouteTicket,
        outcome: Result<Route, RoutingError>,
    ) -> Effect {
        if ticket.generation != self.route_generation {
            tracing::debug!(
                facility = %ticket.facility.name,
                "discarding stale route result"
            );
            return Effect::Stale;
        }
        match outcome {
            Ok(route) => {
                let bounds = route.bounds().unwrap_or_else(|| {
                    let mut bounds = Bounds::at(ticket.origin);
                    bounds.extend(ticket.destination());
                    bounds
                });
                tracing::debug!(
                    facility = %ticket.facility.name,
                    points = route.path.len(),
                    "route installed"
                );
                self.selected = Some(ticket.facility);
                self.route = Some(route);
                Effect::RouteReady { bounds }
            }
            Err(e) => {
                tracing::warn!(facility = %ticket.facility.name, error = %e, "routing failed");
                Effect::Notice(Notice::RouteUnavailable {
                    facility: ticket.facility.name,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Open the info overlay for a ranked facility without routing to it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuchResult`] for an out-of-range index.
    pub fn inspect(&mut self, index: usize) -> Result<Effect, SessionError> {
        let facility = self.ranked_facility(index)?.clone();
        self.selected = Some(facility);
        Ok(Effect::SelectionChanged)
    }

    pub fn close_overlay(&mut self) -> Effect {
        if self.selected.take().is_some() {
            Effect::SelectionChanged
        } else {
            Effect::Unchanged
        }
    }

    fn ranked_facility(&self, index: usize) -> Result<&Facility, SessionError> {
        self.ranked
            .get(index)
            .map(|r| &r.facility)
            .ok_or(SessionError::NoSuchResult {
                index,
                len: self.ranked.len(),
            })
    }

    fn set_explicit(&mut self, point: Option<Point>) {
        self.explicit = point;
        self.point_generation += 1;
    }

    /// Run a ranking pass around the active point. Without an age class the
    /// pass is empty whatever the center, so it runs even with no point.
    fn rerank(&mut self) -> Effect {
        let results = match (self.active_point(), self.filter.age_class) {
            (Some(center), _) => rank(self.dataset.facilities(), center, &self.filter),
            (None, None) => Vec::new(),
            (None, Some(_)) => return Effect::Unchanged,
        };
        self.install(results)
    }

    fn install(&mut self, results: Vec<RankedFacility>) -> Effect {
        self.selected = None;
        self.route = None;
        self.route_generation += 1;
        self.ranked = results;
        Effect::Reranked {
            results: self.ranked.len(),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
