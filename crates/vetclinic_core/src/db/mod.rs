//! SQLite storage bootstrap, schema migrations and connection pooling.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the clinic stores.
//! - Apply schema migrations in deterministic order.
//! - Hand out pooled connections with scoped release.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Stores must not read/write clinic data before migrations succeed.
//! - A checked-out connection always returns to its pool on drop.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod migrations;
mod open;
mod pool;

pub use pool::{DbLocation, DbPool, PoolConfig, PoolStatus, PooledConnection};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// No connection became available within the wait window, either
    /// because all were checked out or because new ones failed to open.
    PoolTimeout {
        waited: Duration,
        source: r2d2::Error,
    },
    InvalidConfig(String),
}

impl DbError {
    /// Returns the wrapped SQLite error, if this is one.
    pub fn as_sqlite(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "clinic schema v{db_version} is newer than this build supports (v{latest_supported})"
            ),
            Self::PoolTimeout { waited, source } => write!(
                f,
                "no pooled connection became available within {}ms: {source}",
                waited.as_millis()
            ),
            Self::InvalidConfig(message) => write!(f, "invalid pool configuration: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::PoolTimeout { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
