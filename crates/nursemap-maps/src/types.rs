//! Google Maps web service response types.
//!
//! Every response also carries a top-level `status` (`"OK"`, `"ZERO_RESULTS"`,
//! `"OVER_QUERY_LIMIT"`, ...) and an optional `error_message`; those are
//! checked on the raw JSON before these types are deserialized.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// geocode/json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// directions/json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    pub overview_polyline: EncodedPolyline,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
}

/// `{ "text": "1.2 km", "value": 1234 }`
#[derive(Debug, Deserialize)]
pub struct TextValue {
    pub value: u64,
}
