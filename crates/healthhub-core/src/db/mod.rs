//! Storefront profile database.
//!
//! One SQLite file per device profile. It holds two tables:
//!
//! - `preferences`: the key-value store behind [`crate::store::PreferenceStore`]
//!   (last view, display flags, auth, order history, audit trail)
//! - `products`: the local catalog, including stock and recall notices
//!
//! Queries live next to the table they touch (`preferences.rs`, `products.rs`).

mod preferences;
mod products;
mod schema;

pub use schema::SCHEMA;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored JSON value (order history, audit trail, product lists) failed
    /// to encode or decode.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored row holds a value the models cannot represent.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the profile at `path`, creating the file and tables on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Fresh profile with nothing persisted.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one transaction. Every write made through this handle
    /// while `f` runs is rolled back if it returns an error.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> DbResult<T>) -> DbResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}
