//! Capability interfaces for the external services a session depends on.
//!
//! Production adapters live in `nursemap-maps`; tests use stand-ins.

use std::future::Future;

use nursemap_core::{Bounds, Point};
use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, GeolocationError, RoutingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
}

impl TravelMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
        }
    }
}

/// A route returned by a [`RouteProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Ordered overview path from origin to destination.
    pub path: Vec<Point>,
    pub distance_meters: Option<f64>,
    pub duration_secs: Option<u64>,
}

impl Route {
    /// Bounding box of the path, `None` when the path is empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.path.iter().copied())
    }
}

/// Resolves free-text addresses to coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Point, GeocodeError>> + Send;
}

/// Computes routes between two points.
pub trait RouteProvider {
    fn route(
        &self,
        origin: Point,
        destination: Point,
        mode: TravelMode,
    ) -> impl Future<Output = Result<Route, RoutingError>> + Send;
}

/// Reports the device's current position.
pub trait PositionSource {
    fn current_position(&self) -> impl Future<Output = Result<Point, GeolocationError>> + Send;
}

/// Position source backed by a configured point, or permanently unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Point>);

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Point, GeolocationError> {
        self.0.ok_or_else(|| GeolocationError {
            reason: "no device position configured".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_bounds_cover_path() {
        let route = Route {
            path: vec![
                Point::new(35.561, 139.716),
                Point::new(35.563, 139.718),
                Point::new(35.565, 139.720),
            ],
            distance_meters: Some(640.0),
            duration_secs: Some(480),
        };
        let bounds = route.bounds().unwrap();
        assert_eq!(bounds.south_west, Point::new(35.561, 139.716));
        assert_eq!(bounds.north_east, Point::new(35.565, 139.720));
    }

    #[test]
    fn empty_route_has_no_bounds() {
        let route = Route {
            path: Vec::new(),
            distance_meters: None,
            duration_secs: None,
        };
        assert!(route.bounds().is_none());
    }

    #[tokio::test]
    async fn fixed_position_reports_configured_point() {
        let here = Point::new(35.57, 139.70);
        assert_eq!(FixedPosition(Some(here)).current_position().await, Ok(here));
        assert!(FixedPosition(None).current_position().await.is_err());
    }
}
