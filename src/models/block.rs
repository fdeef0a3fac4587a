//! Seating block

use serde::{Deserialize, Serialize};

/// A group of identically shaped rows within a flight.
///
/// Missing fields read as zero / empty so the validator, not the body
/// parser, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub rows: i64,
    /// Seat counts of the left and right window groups
    #[serde(default, rename = "side_seat_numbers")]
    pub side_seat_counts: Vec<i64>,
    /// Seat counts of the groups between the aisles, left to right
    #[serde(default, rename = "middle_seat_numbers")]
    pub middle_seat_groups: Vec<i64>,
}

impl Block {
    pub fn new(rows: i64, side_seat_counts: Vec<i64>, middle_seat_groups: Vec<i64>) -> Self {
        Self {
            rows,
            side_seat_counts,
            middle_seat_groups,
        }
    }
}

/// Kind of a stored seat-group size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Side = 1,
    Middle = 2,
}

impl BlockKind {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(BlockKind::Side),
            2 => Some(BlockKind::Middle),
            _ => None,
        }
    }
}
