//! Facility dataset loading.
//!
//! The dataset is a JSON array of flat records:
//!
//! ```json
//! { "name": "...", "address": "...", "lat": 35.56, "lng": 139.71,
//!   "evaluation_url": "https://...",
//!   "age_0": 2, ..., "age_5": 0,
//!   "capacity_age_0": 6, ..., "capacity_age_5": 20 }
//! ```
//!
//! Records that cannot be placed on the map (missing name or coordinates) are
//! skipped with a warning. Slot counts that are not usable numbers become
//! `None` rather than zero.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::DatasetError;
use crate::facility::{AgeClass, Facility, FacilityId, SlotTable};
use crate::geo::Point;

/// Placeholder stored when a record has no address.
const MISSING_ADDRESS: &str = "-";

#[derive(Debug, Deserialize)]
struct RawFacility {
    name: String,
    #[serde(default)]
    address: Option<String>,
    lat: f64,
    lng: f64,
    #[serde(default)]
    evaluation_url: Option<String>,
    #[serde(flatten)]
    slots: Map<String, Value>,
}

/// Immutable snapshot of every facility, shared cheaply between owners.
#[derive(Debug, Clone)]
pub struct Dataset {
    facilities: Arc<[Facility]>,
    loaded_at: DateTime<Utc>,
    skipped: usize,
}

impl Dataset {
    /// Dataset with no facilities, used when loading fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_facilities(Vec::new())
    }

    /// Builds a dataset from already-parsed facilities, renumbering their ids
    /// to match their position.
    #[must_use]
    pub fn from_facilities(mut facilities: Vec<Facility>) -> Self {
        for (index, facility) in facilities.iter_mut().enumerate() {
            facility.id = FacilityId(index);
        }
        Self {
            facilities: facilities.into(),
            loaded_at: Utc::now(),
            skipped: 0,
        }
    }

    #[must_use]
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    #[must_use]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Number of records dropped during parsing.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

/// Parse a dataset from its JSON text.
///
/// # Errors
///
/// Returns [`DatasetError::Json`] if the text is not JSON and
/// [`DatasetError::NotAnArray`] if the top-level value is not an array.
/// Individual malformed records are skipped, not reported as errors.
pub fn parse_dataset(json: &str) -> Result<Dataset, DatasetError> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DatasetError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let total = items.len();
    let mut facilities = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawFacility>(item) {
            Ok(raw) => match into_facility(raw, FacilityId(facilities.len())) {
                Some(facility) => facilities.push(facility),
                None => tracing::warn!(index, "skipping facility with non-finite coordinates"),
            },
            Err(e) => tracing::warn!(index, error = %e, "skipping malformed facility record"),
        }
    }

    let skipped = total - facilities.len();
    tracing::debug!(loaded = facilities.len(), skipped, "parsed facility dataset");

    Ok(Dataset {
        facilities: facilities.into(),
        loaded_at: Utc::now(),
        skipped,
    })
}

/// Read and parse a dataset file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the file cannot be read, otherwise any
/// error from [`parse_dataset`].
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_dataset(&content)
}

fn into_facility(raw: RawFacility, id: FacilityId) -> Option<Facility> {
    let position = Point::new(raw.lat, raw.lng);
    if !position.is_finite() {
        return None;
    }

    let mut vacancy = SlotTable::default();
    let mut capacity = SlotTable::default();
    for age in AgeClass::all() {
        vacancy.set(age, slot_count(raw.slots.get(&format!("age_{age}"))));
        capacity.set(age, slot_count(raw.slots.get(&format!("capacity_age_{age}"))));
    }

    Some(Facility {
        id,
        name: raw.name,
        address: raw
            .address
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| MISSING_ADDRESS.to_string()),
        position,
        evaluation_url: raw.evaluation_url.filter(|u| !u.trim().is_empty()),
        vacancy,
        capacity,
    })
}

/// Interpret a slot cell. Non-negative numbers and numeric strings are
/// accepted; null, negative, non-finite and free text are treated as absent.
/// A fractional count rounds up, so any positive value still reads as a vacancy.
fn slot_count(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_f64().and_then(float_count)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_count))
        }
        _ => None,
    }
}

// Range is checked before the cast.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_count(f: f64) -> Option<u32> {
    let f = f.ceil();
    (f.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&f)).then(|| f as u32)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age(v: i64) -> AgeClass {
        AgeClass::try_from(v).unwrap()
    }

    #[test]
    fn parses_flat_records() {
        let json = r#"[
            {"name": "Alpha", "address": "池上4-5-2", "lat": 35.561, "lng": 139.716,
             "evaluation_url": "https://example.org/alpha",
             "age_0": 2, "age_1": 0, "capacity_age_0": 6, "capacity_age_1": 9}
        ]"#;
        let dataset = parse_dataset(json).unwrap();
        assert_eq!(dataset.len(), 1);
        let alpha = &dataset.facilities()[0];
        assert_eq!(alpha.id, FacilityId(0));
        assert_eq!(alpha.name, "Alpha");
        assert_eq!(alpha.address, "池上4-5-2");
        assert_eq!(alpha.vacancy.get(age(0)), Some(2));
        assert_eq!(alpha.vacancy.get(age(1)), Some(0));
        assert_eq!(alpha.vacancy.get(age(2)), None);
        assert_eq!(alpha.capacity.get(age(1)), Some(9));
        assert_eq!(
            alpha.evaluation_url.as_deref(),
            Some("https://example.org/alpha")
        );
    }

    #[test]
    fn slot_cells_are_interpreted() {
        let json = r#"[
            {"name": "Beta", "lat": 35.5, "lng": 139.7,
             "age_0": "3", "age_1": null, "age_2": "-", "age_3": -1,
             "age_4": 1.5, "age_5": 2.0}
        ]"#;
        let dataset = parse_dataset(json).unwrap();
        let beta = &dataset.facilities()[0];
        assert_eq!(beta.vacancy.get(age(0)), Some(3));
        assert_eq!(beta.vacancy.get(age(1)), None);
        assert_eq!(beta.vacancy.get(age(2)), None);
        assert_eq!(beta.vacancy.get(age(3)), None);
        assert_eq!(beta.vacancy.get(age(4)), Some(2));
        assert_eq!(beta.vacancy.get(age(5)), Some(2));
        assert_eq!(beta.address, MISSING_ADDRESS);
    }

    #[test]
    fn malformed_records_are_skipped_and_ids_stay_dense() {
        let json = r#"[
            {"name": "NoCoords", "age_0": 1},
            {"name": "Gamma", "lat": 35.5, "lng": 139.7},
            {"lat": 35.5, "lng": 139.7},
            {"name": "Delta", "lat": 35.6, "lng": 139.8, "evaluation_url": ""}
        ]"#;
        let dataset = parse_dataset(json).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.skipped(), 2);
        assert_eq!(dataset.facilities()[0].name, "Gamma");
        assert_eq!(dataset.facilities()[1].id, FacilityId(1));
        assert!(dataset.facilities()[1].evaluation_url.is_none());
    }

    #[test]
    fn non_array_is_rejected() {
        let err = parse_dataset(r#"{"name": "Alpha"}"#).unwrap_err();
        assert!(
            matches!(err, DatasetError::NotAnArray { found: "an object" }),
            "got {err:?}"
        );
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            parse_dataset("[{"),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_dataset(Path::new("/nonexistent/nursery.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/nursery.json"));
    }
}
