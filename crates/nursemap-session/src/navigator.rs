//! Drives a [`Session`] against live providers.
//!
//! Each method runs one begin/await/complete cycle. Callers that need to
//! interleave requests can use the ticket API on [`Session`] directly.

use crate::error::SessionError;
use crate::providers::{Geocoder, PositionSource, RouteProvider};
use crate::state::{Effect, Session};

pub struct Navigator<G, R> {
    session: Session,
    geocoder: G,
    router: R,
}

impl<G, R> Navigator<G, R>
where
    G: Geocoder,
    R: RouteProvider,
{
    #[must_use]
    pub fn new(session: Session, geocoder: G, router: R) -> Self {
        Self {
            session,
            geocoder,
            router,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[must_use]
    pub fn router(&self) -> &R {
        &self.router
    }

    /// Ask `source` for the device position once and feed the answer in.
    pub async fn locate<P: PositionSource>(&mut self, source: &P) -> Effect {
        match source.current_position().await {
            Ok(point) => self.session.geolocation_acquired(point),
            Err(e) => self.session.geolocation_unavailable(&e),
        }
    }

    /// Geocode `query` and move the explicit point there on success.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyAddress`] for a blank query. Provider
    /// failures are reported as [`Effect::Notice`], not as errors.
    pub async fn search_address(&mut self, query: &str) -> Result<Effect, SessionError> {
        let ticket = self.session.begin_geocode(query)?;
        let outcome = self.geocoder.geocode(ticket.query()).await;
        Ok(self.session.complete_geocode(ticket, outcome))
    }

    /// Request a walking route to the ranked result at `index` and highlight it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuchResult`] or [`SessionError::NoOrigin`]
    /// before any provider call is made.
    pub async fn select_result(&mut self, index: usize) -> Result<Effect, SessionError> {
        let ticket = self.session.begin_route(index)?;
        tracing::debug!(
            facility = %ticket.facility().name,
            origin = %ticket.origin(),
            "requesting walking route"
        );
        let outcome = self
            .router
            .route(ticket.origin(), ticket.destination(), ticket.mode())
            .await;
        Ok(self.session.complete_route(ticket, outcome))
    }
}
