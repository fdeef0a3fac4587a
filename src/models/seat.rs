//! Seat

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::{EntitySchema, FieldDescriptor, ValueKind};

/// Seat classification. The numeric order is the allocation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SeatType {
    Aisle = 1,
    Window = 2,
    Middle = 3,
}

impl SeatType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<SeatType> for u8 {
    fn from(seat_type: SeatType) -> Self {
        seat_type.code()
    }
}

impl TryFrom<u8> for SeatType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SeatType::Aisle),
            2 => Ok(SeatType::Window),
            3 => Ok(SeatType::Middle),
            other => Err(format!("unknown seat type {}", other)),
        }
    }
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatType::Aisle => write!(f, "aisle"),
            SeatType::Window => write!(f, "window"),
            SeatType::Middle => write!(f, "middle"),
        }
    }
}

/// A stored seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub flight_id: i64,
    /// 1-based, contiguous across the whole flight
    pub index: i64,
    #[serde(rename = "type")]
    pub seat_type: SeatType,
    /// 1-based within the seat's block
    pub row: i64,
    /// Column letter, restarting at `A` on every row
    pub line: String,
    pub assigned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Body of `PATCH /flights/{flightId}/seats/{index}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatUpdate {
    #[serde(default)]
    pub assigned: bool,
}

impl EntitySchema for Seat {
    const ENTITY: &'static str = "seat";
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::new("id", ValueKind::Integer),
        FieldDescriptor::new("flight_id", ValueKind::Integer).hidden(),
        // reserved word in SQLite
        FieldDescriptor::new("index", ValueKind::Integer32).rendered_as("\"index\""),
        FieldDescriptor::new("type", ValueKind::Integer32),
        FieldDescriptor::new("row", ValueKind::Integer32),
        FieldDescriptor::new("line", ValueKind::Char),
        FieldDescriptor::new("assigned", ValueKind::Boolean),
        FieldDescriptor::new("created_at", ValueKind::Integer),
        FieldDescriptor::new("updated_at", ValueKind::Integer),
    ];
}
