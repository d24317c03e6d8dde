//! Provider wiring for the CLI.
//!
//! Without an API key the CLI still ranks around explicit points; address
//! search and routing then answer with a provider error, which the session
//! turns into a notice.

use nursemap_core::{AppConfig, Point};
use nursemap_maps::{GoogleMapsClient, MapsError};
use nursemap_session::{GeocodeError, Geocoder, Route, RouteProvider, RoutingError, TravelMode};

const DISABLED_REASON: &str = "GOOGLE_MAPS_API_KEY is not set";

#[derive(Clone)]
pub(crate) enum MapsBackend {
    Google(GoogleMapsClient),
    Disabled,
}

impl MapsBackend {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match GoogleMapsClient::from_config(config) {
            Ok(client) => Ok(Self::Google(client)),
            Err(MapsError::MissingApiKey) => {
                tracing::warn!("{DISABLED_REASON}; address search and routing are disabled");
                Ok(Self::Disabled)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Geocoder for MapsBackend {
    async fn geocode(&self, address: &str) -> Result<Point, GeocodeError> {
        match self {
            Self::Google(client) => client.geocode(address).await,
            Self::Disabled => Err(GeocodeError::Provider(DISABLED_REASON.to_owned())),
        }
    }
}

impl RouteProvider for MapsBackend {
    async fn route(
        &self,
        origin: Point,
        destination: Point,
        mode: TravelMode,
    ) -> Result<Route, RoutingError> {
        match self {
            Self::Google(client) => client.route(origin, destination, mode).await,
            Self::Disabled => Err(RoutingError::Provider(DISABLED_REASON.to_owned())),
        }
    }
}
