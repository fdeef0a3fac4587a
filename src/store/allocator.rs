//! # Seat Allocator
//!
//! Picks the best unassigned seat of a flight and marks it assigned in one
//! write-locking transaction. Priority: lowest row, then seat type
//! (aisle, window, middle), then earliest line letter.

use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::debug;

use super::seats::{seat_from_row, SEAT_COLUMNS};
use super::{Store, StoreResult};
use crate::models::Seat;

impl Store {
    /// Assign the next available seat of `flight_id`, stamping `now`.
    ///
    /// `Ok(None)` when every seat is taken.
    pub fn assign_seat(&self, flight_id: i64, now: i64) -> StoreResult<Option<Seat>> {
        let select = format!(
            "SELECT {} FROM seats WHERE flight_id = ?1 AND assigned = 0 \
             ORDER BY row ASC, type ASC, line ASC LIMIT 1",
            SEAT_COLUMNS
        );

        let seat = self.in_transaction(TransactionBehavior::Immediate, "assign_seat", |tx| {
            let candidate = tx
                .query_row(&select, [flight_id], seat_from_row)
                .optional()?;

            let Some(mut seat) = candidate else {
                return Ok(None);
            };

            tx.execute(
                "UPDATE seats SET assigned = 1, updated_at = ?1 WHERE id = ?2",
                params![now, seat.id],
            )?;
            seat.assigned = true;
            seat.updated_at = now;
            Ok(Some(seat))
        })?;

        match &seat {
            Some(seat) => debug!(
                flight_id,
                index = seat.index,
                row = seat.row,
                line = %seat.line,
                "Seat successfully assigned"
            ),
            None => debug!(flight_id, "No seat available"),
        }
        Ok(seat)
    }
}
