use nursemap_core::CoreError;
use thiserror::Error;

/// Failure reported by a [`Geocoder`](crate::Geocoder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The provider answered but had no match for the address.
    #[error("no match for address \"{query}\"")]
    NotFound { query: String },

    #[error("geocoding provider error: {0}")]
    Provider(String),
}

/// Failure reported by a [`RouteProvider`](crate::RouteProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("no walking route between the points")]
    NoRoute,

    #[error("routing provider error: {0}")]
    Provider(String),
}

/// Device position could not be determined (permission denied or unsupported).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("geolocation unavailable: {reason}")]
pub struct GeolocationError {
    pub reason: String,
}

/// A user action the session cannot carry out in its current state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no ranked result at position {index} (have {len})")]
    NoSuchResult { index: usize, len: usize },

    #[error("no reference point to start a route from")]
    NoOrigin,

    #[error("address query is empty")]
    EmptyAddress,

    #[error(transparent)]
    Core(#[from] CoreError),
}
