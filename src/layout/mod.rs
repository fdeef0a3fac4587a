//! # Seat Layout
//!
//! Validates a proposed flight's seating blocks and expands the validated
//! blocks into concrete seats.

pub mod generator;
pub mod validator;

pub use generator::{generate_seats, NewSeat};
pub use validator::{validate_block, validate_flight, LayoutLimits, SeatingPlan, ValidatedBlock};
