//! # Entity Field Schema
//!
//! Static, per-entity table of the fields a client may sort or filter on,
//! together with the literal rule for each field's values.

use crate::models::FieldError;

/// Semantic type of a field, deciding how filter values are checked and escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Base-10 64-bit integer, rendered verbatim
    Integer,
    /// Base-10 integer that fits in 32 bits, rendered verbatim
    Integer32,
    /// Boolean literal, rendered as `true` / `false`
    Boolean,
    /// Exactly one character, rendered as a quoted string
    Char,
    /// Any string, rendered quoted with `'` doubled
    String,
}

/// One queryable field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name clients use in `sort` and `filter`
    pub name: &'static str,
    /// SQL identifier the field renders as
    pub column: &'static str,
    pub sortable: bool,
    pub filterable: bool,
    pub kind: ValueKind,
}

impl FieldDescriptor {
    /// A sortable and filterable field whose column matches its name
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            column: name,
            sortable: true,
            filterable: true,
            kind,
        }
    }

    /// Render under a different SQL identifier
    pub const fn rendered_as(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    /// Neither sortable nor filterable
    pub const fn hidden(mut self) -> Self {
        self.sortable = false;
        self.filterable = false;
        self
    }

    /// Check a filter value against this field's kind and escape it.
    pub fn literal(&self, value: &str) -> Result<String, FieldError> {
        match self.kind {
            ValueKind::Integer => self.integer(value.parse::<i64>().is_ok(), value),
            ValueKind::Integer32 => self.integer(value.parse::<i32>().is_ok(), value),
            ValueKind::Boolean => match parse_bool(value) {
                Some(b) => Ok(b.to_string()),
                None => Err(FieldError::invalid(
                    self.name,
                    format!("{} is not boolean", self.name),
                )),
            },
            ValueKind::Char => {
                if value.chars().count() != 1 {
                    return Err(FieldError::invalid(
                        self.name,
                        format!("{} is not one character", self.name),
                    ));
                }
                Ok(quote(value))
            }
            ValueKind::String => Ok(quote(value)),
        }
    }

    fn integer(&self, parsed: bool, value: &str) -> Result<String, FieldError> {
        if parsed {
            Ok(value.to_string())
        } else {
            Err(FieldError::invalid(
                self.name,
                format!("{} is not integer", self.name),
            ))
        }
    }
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Accepts the usual spellings of a boolean literal.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Sort/filter capabilities of an entity
///
/// Implemented once per entity over a static field table. Lookups are pure and
/// the table is never mutated, so the schema is safe to read from any request.
pub trait EntitySchema {
    /// Entity name used in log events
    const ENTITY: &'static str;

    /// Fields in declaration order
    const FIELDS: &'static [FieldDescriptor];

    fn is_sortable(name: &str) -> bool {
        Self::sort_descriptor(name).is_some()
    }

    fn sort_descriptor(name: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|f| f.sortable && f.name == name)
    }

    fn filter_descriptor(name: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|f| f.filterable && f.name == name)
    }

    /// Filterable fields in declaration order
    fn all_filterable_fields() -> Vec<&'static FieldDescriptor> {
        Self::FIELDS.iter().filter(|f| f.filterable).collect()
    }
}
