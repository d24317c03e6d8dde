//! Google Maps adapters: geocoding and walking directions behind the
//! session's provider traits, plus remote dataset download.

pub mod client;
pub mod dataset;
pub mod error;
pub mod polyline;
pub(crate) mod retry;
pub mod types;

pub use client::{GoogleMapsClient, DEFAULT_BASE_URL};
pub use dataset::fetch_dataset;
pub use error::MapsError;
pub use polyline::PolylineError;
