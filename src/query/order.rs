//! Ordering and pagination clauses

use std::fmt;

use super::schema::FieldDescriptor;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive `asc` / `desc`
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: &'static FieldDescriptor,
    pub direction: Direction,
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.column, self.direction.as_sql())
    }
}

/// Multi-key ordering in client order; empty leaves the store default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    terms: Vec<OrderTerm>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, term: OrderTerm) {
        self.terms.push(term);
    }

    pub fn terms(&self) -> &[OrderTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `" ORDER BY a ASC, b DESC"`, or empty
    pub fn to_sql(&self) -> String {
        if self.terms.is_empty() {
            return String::new();
        }
        let keys = self
            .terms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(" ORDER BY {}", keys)
    }
}

/// Pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limitation {
    pub offset: u64,
    pub count: u64,
}

impl Limitation {
    /// `" LIMIT {offset}, {count}"`
    pub fn to_sql(&self) -> String {
        format!(" LIMIT {}, {}", self.offset, self.count)
    }
}
