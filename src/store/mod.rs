//! # Relational Store
//!
//! SQLite persistence for flights, their blocks and seats.
//!
//! A single connection sits behind a mutex. Multi-statement mutations run in
//! one transaction through [`Store::in_transaction`], which commits on success
//! and rolls back on any failure. A failed rollback is logged and the
//! original error is returned.

pub mod allocator;
pub mod errors;
pub mod flights;
pub mod seats;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, error};

pub use errors::{StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS flights (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS blocks (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    flight_id INTEGER NOT NULL REFERENCES flights (id),
    "rows"    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS seat_numbers (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    block_id INTEGER NOT NULL REFERENCES blocks (id),
    type     INTEGER NOT NULL,
    number   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS seats (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    flight_id  INTEGER NOT NULL REFERENCES flights (id),
    "index"    INTEGER NOT NULL,
    type       INTEGER NOT NULL,
    row        INTEGER NOT NULL,
    line       TEXT    NOT NULL,
    assigned   BOOLEAN NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT 0,
    UNIQUE (flight_id, "index")
);

CREATE INDEX IF NOT EXISTS blocks_flight ON blocks (flight_id);
CREATE INDEX IF NOT EXISTS seat_numbers_block ON seat_numbers (block_id);
CREATE INDEX IF NOT EXISTS seats_allocation ON seats (flight_id, assigned, row, type, line);
"#;

/// Booking store over one SQLite connection
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Store opened");
        Self::with_connection(conn)
    }

    /// Private in-memory database, used by tests and `--db :memory:`.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run `f` inside one transaction.
    fn in_transaction<T>(
        &self,
        behavior: TransactionBehavior,
        operation: &'static str,
        f: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(behavior)?;

        match f(&*tx) {
            Ok(value) => {
                tx.commit().map_err(|err| {
                    error!(operation, error = %err, "Error committing transaction");
                    StoreError::from(err)
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(operation, error = %rollback_err, "Error rolling back transaction");
                }
                error!(operation, code = err.code(), error = %err, "Transaction aborted");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.db");

        drop(Store::open(&path).unwrap());
        let store = Store::open(&path).unwrap();
        assert_eq!(store.count_flights(&Default::default()).unwrap(), 0);
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let result: StoreResult<()> =
            store.in_transaction(TransactionBehavior::Deferred, "test", |tx| {
                tx.execute(
                    "INSERT INTO flights (name, created_at) VALUES ('LH400', 1)",
                    [],
                )?;
                Err(StoreError::InvalidData("abort".to_string()))
            });
        assert!(result.is_err());
        assert_eq!(store.count_flights(&Default::default()).unwrap(), 0);
    }
}
