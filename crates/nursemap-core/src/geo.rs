//! Geographic primitives: points, the planar distance estimate, and bounding boxes.
//!
//! The distance estimate treats one degree of latitude and one degree of
//! longitude as the same length. That is wrong away from the equator, but the
//! error is uniform over the few kilometres a nursery search covers, and the
//! ranking only needs a consistent ordering plus a radius cut-off.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Approximate meters per degree used by [`distance_meters`].
pub const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `"lat,lng"` (whitespace around either number is ignored).
impl FromStr for Point {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidPoint(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| invalid())?;
        let point = Point::new(lat, lng);
        if !point.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(invalid());
        }
        Ok(point)
    }
}

/// Planar distance between two points in meters.
///
/// Euclidean norm of the raw degree delta scaled by [`METERS_PER_DEGREE`].
/// Ignores longitude compression and curvature; only meaningful for short
/// ranges at mid latitudes.
#[must_use]
pub fn distance_meters(a: Point, b: Point) -> f64 {
    (a.lat - b.lat).hypot(a.lng - b.lng) * METERS_PER_DEGREE
}

/// Axis-aligned lat/lng rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Point,
    pub north_east: Point,
}

impl Bounds {
    /// Degenerate bounds covering a single point.
    #[must_use]
    pub const fn at(point: Point) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::at(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: Point) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}
