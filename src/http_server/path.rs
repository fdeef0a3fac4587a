//! Path parameter parsing
//!
//! Path segments arrive as strings so that a malformed value answers 400
//! with an error list instead of the extractor's plain-text rejection.

use tracing::debug;

use crate::models::{FieldError, ValidationErrors};

fn reject(field: &str, message: &str, raw: &str) -> ValidationErrors {
    debug!(field, value = raw, "{}", message);
    FieldError::invalid(field, message).into()
}

pub fn flight_id(raw: &str) -> Result<i64, ValidationErrors> {
    raw.parse()
        .map_err(|_| reject("flightId", "Flight id is not integer", raw))
}

/// Seat index, limited to 32 bits
pub fn seat_index(raw: &str) -> Result<i64, ValidationErrors> {
    raw.parse::<i32>()
        .map(i64::from)
        .map_err(|_| reject("index", "Index is not integer", raw))
}

pub fn row(raw: &str) -> Result<i64, ValidationErrors> {
    raw.parse()
        .map_err(|_| reject("row", "Row is not integer", raw))
}

/// Exactly one character
pub fn line(raw: &str) -> Result<String, ValidationErrors> {
    if raw.chars().count() == 1 {
        Ok(raw.to_string())
    } else {
        Err(reject("line", "Line is not one character", raw))
    }
}
