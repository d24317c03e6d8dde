use nursemap_core::DatasetError;
use thiserror::Error;

use crate::polyline::PolylineError;

/// Errors returned by the Google Maps web service client.
#[derive(Debug, Error)]
pub enum MapsError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than `OK`.
    #[error("Maps API status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: String,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid route geometry: {0}")]
    Polyline(#[from] PolylineError),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("GOOGLE_MAPS_API_KEY is not set")]
    MissingApiKey,

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl MapsError {
    /// The API status string, when the failure is an API-level status.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        match self {
            MapsError::Status { status, .. } => Some(status),
            _ => None,
        }
    }
}
