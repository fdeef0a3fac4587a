//! Flight persistence

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;

use super::{Store, StoreError, StoreResult};
use crate::layout::{NewSeat, SeatingPlan};
use crate::models::{Block, BlockKind, Flight};
use crate::query::{CompiledQuery, Predicate};

fn flight_from_row(row: &Row<'_>) -> rusqlite::Result<Flight> {
    Ok(Flight {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        blocks: Vec::new(),
    })
}

impl Store {
    /// Persist a validated flight, its blocks and its generated seats.
    pub fn create_flight(
        &self,
        plan: &SeatingPlan,
        seats: &[NewSeat],
        created_at: i64,
    ) -> StoreResult<Flight> {
        let flight = self.in_transaction(TransactionBehavior::Deferred, "create_flight", |tx| {
            tx.execute(
                "INSERT INTO flights (name, created_at) VALUES (?1, ?2)",
                params![plan.name, created_at],
            )?;
            let flight_id = tx.last_insert_rowid();

            let blocks: Vec<Block> = plan.blocks.iter().map(|b| b.to_block()).collect();
            insert_blocks(tx, flight_id, &blocks)?;
            insert_seats(tx, flight_id, seats)?;

            Ok(Flight {
                id: flight_id,
                name: plan.name.clone(),
                created_at,
                blocks,
            })
        })?;

        debug!(
            flight_id = flight.id,
            blocks = flight.blocks.len(),
            seats = seats.len(),
            "Flight successfully created"
        );
        Ok(flight)
    }

    /// Read a flight with its blocks in declaration order.
    pub fn retrieve_flight(&self, id: i64) -> StoreResult<Option<Flight>> {
        let conn = self.conn()?;
        let flight = conn
            .query_row(
                "SELECT id, name, created_at FROM flights WHERE id = ?1",
                [id],
                flight_from_row,
            )
            .optional()?;

        let Some(mut flight) = flight else {
            debug!(flight_id = id, "Flight not found");
            return Ok(None);
        };
        flight.blocks = load_blocks(&conn, id)?;

        debug!(flight_id = id, "Flight successfully retrieved");
        Ok(Some(flight))
    }

    /// Delete a flight's seats, blocks and the flight itself.
    ///
    /// Returns `false` when no flight had this id.
    pub fn delete_flight(&self, id: i64) -> StoreResult<bool> {
        let deleted = self.in_transaction(TransactionBehavior::Deferred, "delete_flight", |tx| {
            tx.execute("DELETE FROM seats WHERE flight_id = ?1", [id])?;
            tx.execute(
                "DELETE FROM seat_numbers WHERE block_id IN (SELECT id FROM blocks WHERE flight_id = ?1)",
                [id],
            )?;
            tx.execute("DELETE FROM blocks WHERE flight_id = ?1", [id])?;
            let removed = tx.execute("DELETE FROM flights WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })?;

        debug!(flight_id = id, deleted, "Flight delete finished");
        Ok(deleted)
    }

    /// List flights matching a compiled query. Blocks are not loaded.
    pub fn list_flights(&self, query: &CompiledQuery) -> StoreResult<Vec<Flight>> {
        let sql = format!(
            "SELECT id, name, created_at FROM flights{}{}{}",
            query.predicate.to_where_sql(),
            query.order.to_sql(),
            query.limitation.to_sql()
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let flights = stmt
            .query_map([], flight_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(sql = %sql, count = flights.len(), "Flights successfully listed");
        Ok(flights)
    }

    /// Number of flights matching `predicate`.
    pub fn count_flights(&self, predicate: &Predicate) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM flights{}", predicate.to_where_sql());
        let conn = self.conn()?;
        let total: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(total)
    }
}

fn insert_blocks(tx: &Connection, flight_id: i64, blocks: &[Block]) -> StoreResult<()> {
    let mut insert_block =
        tx.prepare_cached("INSERT INTO blocks (flight_id, \"rows\") VALUES (?1, ?2)")?;
    let mut insert_number = tx
        .prepare_cached("INSERT INTO seat_numbers (block_id, type, number) VALUES (?1, ?2, ?3)")?;

    for block in blocks {
        insert_block.execute(params![flight_id, block.rows])?;
        let block_id = tx.last_insert_rowid();

        for &number in &block.side_seat_counts {
            insert_number.execute(params![block_id, BlockKind::Side.code(), number])?;
        }
        for &number in &block.middle_seat_groups {
            insert_number.execute(params![block_id, BlockKind::Middle.code(), number])?;
        }
    }
    Ok(())
}

fn insert_seats(tx: &Connection, flight_id: i64, seats: &[NewSeat]) -> StoreResult<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO seats (flight_id, \"index\", type, row, line, assigned, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0)",
    )?;

    for seat in seats {
        stmt.execute(params![
            flight_id,
            seat.index,
            seat.seat_type,
            seat.row,
            seat.line.to_string(),
            seat.created_at
        ])?;
    }
    Ok(())
}

fn load_blocks(conn: &Connection, flight_id: i64) -> StoreResult<Vec<Block>> {
    let mut block_stmt =
        conn.prepare_cached("SELECT id, \"rows\" FROM blocks WHERE flight_id = ?1 ORDER BY id")?;
    let rows = block_stmt
        .query_map([flight_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut number_stmt = conn
        .prepare_cached("SELECT type, number FROM seat_numbers WHERE block_id = ?1 ORDER BY id")?;

    let mut blocks = Vec::with_capacity(rows.len());
    for (block_id, block_rows) in rows {
        let numbers = number_stmt
            .query_map([block_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut block = Block::new(block_rows, Vec::new(), Vec::new());
        for (kind, number) in numbers {
            match BlockKind::from_code(kind) {
                Some(BlockKind::Side) => block.side_seat_counts.push(number),
                Some(BlockKind::Middle) => block.middle_seat_groups.push(number),
                None => {
                    return Err(StoreError::InvalidData(format!(
                        "seat number kind {} in block {}",
                        kind, block_id
                    )))
                }
            }
        }
        blocks.push(block);
    }
    Ok(blocks)
}
