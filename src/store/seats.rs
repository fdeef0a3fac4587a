//! Seat persistence

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{Store, StoreResult};
use crate::models::{Seat, SeatType};
use crate::query::{CompiledQuery, Predicate};

pub(crate) const SEAT_COLUMNS: &str =
    r#"id, flight_id, "index", type, row, line, assigned, created_at, updated_at"#;

impl ToSql for SeatType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.code())))
    }
}

impl FromSql for SeatType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        u8::try_from(code)
            .ok()
            .and_then(|c| SeatType::try_from(c).ok())
            .ok_or(FromSqlError::OutOfRange(code))
    }
}

pub(crate) fn seat_from_row(row: &Row<'_>) -> rusqlite::Result<Seat> {
    Ok(Seat {
        id: row.get(0)?,
        flight_id: row.get(1)?,
        index: row.get(2)?,
        seat_type: row.get(3)?,
        row: row.get(4)?,
        line: row.get(5)?,
        assigned: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl Store {
    /// Seat by its flight-wide index
    pub fn retrieve_seat(&self, flight_id: i64, index: i64) -> StoreResult<Option<Seat>> {
        let sql = format!(
            "SELECT {} FROM seats WHERE flight_id = ?1 AND \"index\" = ?2",
            SEAT_COLUMNS
        );
        let conn = self.conn()?;
        let seat = conn
            .query_row(&sql, params![flight_id, index], seat_from_row)
            .optional()?;

        debug!(flight_id, index, found = seat.is_some(), "Seat retrieved");
        Ok(seat)
    }

    /// Seat by its position within the flight
    pub fn find_seat(&self, flight_id: i64, row: i64, line: &str) -> StoreResult<Option<Seat>> {
        let sql = format!(
            "SELECT {} FROM seats WHERE flight_id = ?1 AND row = ?2 AND line = ?3 ORDER BY id LIMIT 1",
            SEAT_COLUMNS
        );
        let conn = self.conn()?;
        let seat = conn
            .query_row(&sql, params![flight_id, row, line], seat_from_row)
            .optional()?;

        debug!(flight_id, row, line, found = seat.is_some(), "Seat found");
        Ok(seat)
    }

    /// Seats of one flight matching a compiled query
    pub fn list_seats(&self, flight_id: i64, query: &CompiledQuery) -> StoreResult<Vec<Seat>> {
        let sql = format!(
            "SELECT {} FROM seats WHERE flight_id = ?1{}{}{}",
            SEAT_COLUMNS,
            query.predicate.to_sql(),
            query.order.to_sql(),
            query.limitation.to_sql()
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let seats = stmt
            .query_map([flight_id], seat_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(flight_id, sql = %sql, count = seats.len(), "Seats successfully listed");
        Ok(seats)
    }

    /// Number of seats of one flight matching `predicate`
    pub fn count_seats(&self, flight_id: i64, predicate: &Predicate) -> StoreResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM seats WHERE flight_id = ?1{}",
            predicate.to_sql()
        );
        let conn = self.conn()?;
        let total: i64 = conn.query_row(&sql, [flight_id], |row| row.get(0))?;
        Ok(total)
    }

    /// Write a seat's `assigned` flag and `updated_at`.
    pub fn update_seat(&self, seat: &Seat) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE seats SET assigned = ?1, updated_at = ?2 WHERE id = ?3",
            params![seat.assigned, seat.updated_at, seat.id],
        )?;

        debug!(
            flight_id = seat.flight_id,
            index = seat.index,
            assigned = seat.assigned,
            "Seat successfully updated"
        );
        Ok(())
    }
}
