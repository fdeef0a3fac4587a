//! Client-input error list
//!
//! Returned by the query compiler and the block validator. Every entry
//! serializes as `{code, message, field}`; the transport answers a non-empty
//! list with 400.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Classification of a client-input failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value could not be URL-unescaped
    ParameterBad,
    /// Value has the wrong literal type
    ParameterInvalid,
    /// Value is negative where it must not be
    ParameterNegative,
    /// Wrong number of elements, or an unparseable record
    StructuralInvalid,
    /// Field is not sortable or filterable
    UnknownField,
    /// Filter operator code is not recognized
    UnknownOperation,
    /// Sort direction is not recognized
    UnknownOrder,
    /// Flight or block violates a business rule
    ValidationFailed,
}

/// A single structured error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    #[serde(skip)]
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub field: String,
}

impl FieldError {
    pub fn new(
        kind: ErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            field: field.into(),
        }
    }

    /// `<field>.Bad`: the raw value could not be unescaped
    pub fn bad(field: &str, label: &str) -> Self {
        Self::new(
            ErrorKind::ParameterBad,
            format!("{}.Bad", field),
            format!("{} can't be unescaped", label),
            field,
        )
    }

    /// `<field>.Invalid`: the value is not of the expected literal type
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::ParameterInvalid,
            format!("{}.Invalid", field),
            message,
            field,
        )
    }

    /// `<field>.Negative`
    pub fn negative(field: &str, label: &str) -> Self {
        Self::new(
            ErrorKind::ParameterNegative,
            format!("{}.Negative", field),
            format!("{} can't be negative", label),
            field,
        )
    }

    /// Business rule violation on a flight or one of its blocks
    pub fn rule(code: &str, message: impl Into<String>, field: &str) -> Self {
        Self::new(ErrorKind::ValidationFailed, code, message, field)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Non-empty list of [`FieldError`]s
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", codes(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn codes(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    /// Wrap a collected list; `None` when nothing was collected.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.code.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_not_an_error() {
        assert!(ValidationErrors::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let errs = ValidationErrors::from(FieldError::negative("offset", "Offset"));
        let json = serde_json::to_value(&errs).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "code": "offset.Negative",
                "message": "Offset can't be negative",
                "field": "offset"
            }])
        );
    }

    #[test]
    fn test_display_joins_codes() {
        let errs = ValidationErrors::from_vec(vec![
            FieldError::invalid("id", "id is not integer"),
            FieldError::bad("sort", "Sort"),
        ])
        .unwrap();
        assert_eq!(errs.to_string(), "id.Invalid, sort.Bad");
    }
}
