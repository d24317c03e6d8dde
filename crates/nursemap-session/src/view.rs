//! Read-only view model derived from a [`Session`].

use chrono::{DateTime, Utc};
use nursemap_core::{AgeClass, Bounds, Facility, Point, RankedFacility};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::state::Session;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Characters left unescaped by a URI component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Home,
    Explicit,
    Facility,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Point,
    pub label: Option<String>,
}

/// One row of the result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub name: String,
    pub distance_meters: u32,
    pub walking_minutes: u32,
    pub vacancy: Option<u32>,
    pub capacity: Option<u32>,
    pub evaluation_url: Option<String>,
    pub position: Point,
}

impl ListEntry {
    fn from_ranked(ranked: &RankedFacility, age: Option<AgeClass>) -> Self {
        let facility = &ranked.facility;
        Self {
            name: facility.name.clone(),
            distance_meters: round_meters(ranked.distance_meters),
            walking_minutes: ranked.walking_minutes(),
            vacancy: age.and_then(|a| facility.vacancy.get(a)),
            capacity: age.and_then(|a| facility.capacity.get(a)),
            evaluation_url: facility.evaluation_url.clone(),
            position: facility.position,
        }
    }
}

/// Info overlay for the highlighted facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub name: String,
    pub address: String,
    pub maps_url: String,
}

impl Overlay {
    fn for_facility(facility: &Facility) -> Self {
        Self {
            name: facility.name.clone(),
            address: facility.address.clone(),
            maps_url: maps_search_url(facility),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    pub path: Vec<Point>,
    pub bounds: Option<Bounds>,
    pub distance_meters: Option<f64>,
    pub duration_secs: Option<u64>,
}

/// Everything a front end needs to draw the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub map_center: Point,
    pub markers: Vec<Marker>,
    pub entries: Vec<ListEntry>,
    pub overlay: Option<Overlay>,
    pub route: Option<RouteView>,
    pub radius_meters: u32,
    pub age_class: Option<AgeClass>,
    pub dataset_loaded_at: DateTime<Utc>,
}

impl SessionView {
    /// Build the view. `default_center` is used when neither an explicit nor
    /// a home point is known.
    #[must_use]
    pub fn build(session: &Session, default_center: Point) -> Self {
        let age = session.filter().age_class;

        let mut markers = Vec::with_capacity(session.ranked().len() + 2);
        if let Some(home) = session.home() {
            markers.push(Marker {
                kind: MarkerKind::Home,
                position: home,
                label: None,
            });
        }
        if let Some(explicit) = session.explicit_point() {
            markers.push(Marker {
                kind: MarkerKind::Explicit,
                position: explicit,
                label: None,
            });
        }
        markers.extend(session.ranked().iter().map(|r| Marker {
            kind: MarkerKind::Facility,
            position: r.facility.position,
            label: Some(r.facility.name.clone()),
        }));

        Self {
            map_center: session.active_point().unwrap_or(default_center),
            markers,
            entries: session
                .ranked()
                .iter()
                .map(|r| ListEntry::from_ranked(r, age))
                .collect(),
            overlay: session.selected().map(Overlay::for_facility),
            route: session.route().map(|route| RouteView {
                path: route.path.clone(),
                bounds: route.bounds(),
                distance_meters: route.distance_meters,
                duration_secs: route.duration_secs,
            }),
            radius_meters: session.filter().radius.meters(),
            age_class: age,
            dataset_loaded_at: session.dataset().loaded_at(),
        }
    }
}

/// Google Maps search link for the facility's name and address.
#[must_use]
pub fn maps_search_url(facility: &Facility) -> String {
    let query = format!("{} {}", facility.name, facility.address);
    format!(
        "{MAPS_SEARCH_URL}{}",
        utf8_percent_encode(&query, URI_COMPONENT)
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_meters(meters: f64) -> u32 {
    meters.round() as u32
}
