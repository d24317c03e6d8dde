//! Decoder for Google's encoded polyline format (precision 1e5).

use nursemap_core::Point;
use thiserror::Error;

const PRECISION: f64 = 1e5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("polyline ends mid-value at byte {position}")]
    Truncated { position: usize },

    #[error("byte {byte:#04x} at {position} is outside the polyline alphabet")]
    InvalidByte { byte: u8, position: usize },

    #[error("polyline value starting before byte {position} is too long")]
    Overflow { position: usize },

    /// A latitude was decoded without its longitude.
    #[error("polyline has an unpaired coordinate")]
    Unpaired,
}

/// Decode an encoded polyline into points.
///
/// # Errors
///
/// Returns a [`PolylineError`] for bytes outside `?`..=`~`, a value cut off
/// by the end of input, or a dangling latitude.
pub fn decode(encoded: &str) -> Result<Vec<Point>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut pos = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while pos < bytes.len() {
        lat += next_value(bytes, &mut pos)?;
        if pos >= bytes.len() {
            return Err(PolylineError::Unpaired);
        }
        lng += next_value(bytes, &mut pos)?;
        points.push(to_point(lat, lng));
    }
    Ok(points)
}

fn next_value(bytes: &[u8], pos: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(PolylineError::Truncated { position: *pos });
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                byte,
                position: *pos,
            });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow { position: *pos });
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *pos += 1;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

#[allow(clippy::cast_precision_loss)]
fn to_point(lat: i64, lng: i64) -> Point {
    Point::new(lat as f64 / PRECISION, lng as f64 / PRECISION)
}
