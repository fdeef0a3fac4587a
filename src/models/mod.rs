//! # Booking Domain Models
//!
//! Wire and row shapes for flights, their seating blocks and seats, plus the
//! structured client error list shared by the query compiler and the layout
//! validator.

pub mod block;
pub mod errors;
pub mod flight;
pub mod seat;

use serde::{Deserialize, Serialize};

pub use block::{Block, BlockKind};
pub use errors::{ErrorKind, FieldError, ValidationErrors};
pub use flight::{Flight, FlightCreate};
pub use seat::{Seat, SeatType, SeatUpdate};

/// Row count answered by the `OPTIONS` list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    pub total_records: i64,
}
