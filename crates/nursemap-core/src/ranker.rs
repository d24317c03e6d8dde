//! Nearby-facility ranking.
//!
//! [`rank`] is a pure function over the dataset slice: every call rescans all
//! facilities, so the output depends only on its arguments.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::facility::{AgeClass, Facility};
use crate::geo::{distance_meters, Point};

/// Upper bound on the number of ranked results.
pub const MAX_RESULTS: usize = 5;

/// Walking pace used for the minutes readout.
pub const WALKING_METERS_PER_MINUTE: f64 = 80.0;

/// Search radius in meters, constrained to `300..=1500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SearchRadius(u32);

impl SearchRadius {
    pub const MIN: u32 = 300;
    pub const MAX: u32 = 1500;
    pub const DEFAULT: SearchRadius = SearchRadius(700);

    /// # Errors
    ///
    /// Returns [`CoreError::RadiusOutOfRange`] outside `300..=1500`.
    pub fn new(meters: u32) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&meters) {
            Ok(Self(meters))
        } else {
            Err(CoreError::RadiusOutOfRange {
                meters,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    #[must_use]
    pub const fn meters(self) -> u32 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for SearchRadius {
    type Error = CoreError;

    fn try_from(meters: u32) -> Result<Self, Self::Error> {
        Self::new(meters)
    }
}

impl From<SearchRadius> for u32 {
    fn from(radius: SearchRadius) -> Self {
        radius.0
    }
}

/// Active search filter. With no age class selected nothing is ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub age_class: Option<AgeClass>,
    pub radius: SearchRadius,
}

/// A facility paired with its distance from the ranking center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFacility {
    pub facility: Facility,
    pub distance_meters: f64,
}

impl RankedFacility {
    /// Walking time at 80 m/min, rounded to the nearest minute.
    // Distances are bounded by the search radius, far below u32::MAX.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn walking_minutes(&self) -> u32 {
        (self.distance_meters / WALKING_METERS_PER_MINUTE).round() as u32
    }
}

/// Rank facilities around `center`.
///
/// Returns at most [`MAX_RESULTS`] facilities that lie strictly inside the
/// radius and report a positive vacancy for the selected age class, nearest
/// first. Equal distances keep dataset order. Without an age class the result
/// is always empty.
#[must_use]
pub fn rank(facilities: &[Facility], center: Point, filter: &SearchFilter) -> Vec<RankedFacility> {
    let Some(age) = filter.age_class else {
        return Vec::new();
    };
    let radius = f64::from(filter.radius.meters());

    let mut candidates: Vec<(usize, f64)> = facilities
        .iter()
        .enumerate()
        .map(|(index, facility)| (index, distance_meters(center, facility.position)))
        .filter(|(_, distance)| *distance < radius)
        .filter(|(index, _)| facilities[*index].has_vacancy(age))
        .collect();

    // sort_by is stable, so ties stay in dataset order.
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.truncate(MAX_RESULTS);

    tracing::debug!(
        %center,
        age = %age,
        radius_m = filter.radius.meters(),
        results = candidates.len(),
        "ranked nearby facilities"
    );

    candidates
        .into_iter()
        .map(|(index, distance_meters)| RankedFacility {
            facility: facilities[index].clone(),
            distance_meters,
        })
        .collect()
}
