//! Facility records and per-age slot tables.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::Point;

/// Age cohort (0 through 5 years) for which vacancy and capacity are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct AgeClass(u8);

impl AgeClass {
    pub const MAX: u8 = 5;

    /// Every age class in ascending order.
    pub fn all() -> impl Iterator<Item = AgeClass> {
        (0..=Self::MAX).map(AgeClass)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<i64> for AgeClass {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(AgeClass)
            .ok_or(CoreError::InvalidAgeClass(value))
    }
}

impl From<AgeClass> for u8 {
    fn from(age: AgeClass) -> Self {
        age.0
    }
}

impl std::fmt::Display for AgeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AgeClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::UnparsableAgeClass(s.to_string()))?;
        AgeClass::try_from(value)
    }
}

/// Slot counts indexed by age class. `None` means the dataset had no usable
/// number for that cohort, which is different from a count of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTable([Option<u32>; 6]);

impl SlotTable {
    #[must_use]
    pub const fn new(slots: [Option<u32>; 6]) -> Self {
        Self(slots)
    }

    #[must_use]
    pub const fn get(&self, age: AgeClass) -> Option<u32> {
        self.0[age.index()]
    }

    pub fn set(&mut self, age: AgeClass, count: Option<u32>) {
        self.0[age.index()] = count;
    }
}

/// Positional key of a facility within its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub address: String,
    pub position: Point,
    /// Third-party evaluation report link.
    pub evaluation_url: Option<String>,
    pub vacancy: SlotTable,
    pub capacity: SlotTable,
}

impl Facility {
    /// Open slots for `age`, only when the dataset recorded a positive count.
    #[must_use]
    pub fn has_vacancy(&self, age: AgeClass) -> bool {
        self.vacancy.get(age).is_some_and(|n| n > 0)
    }
}
