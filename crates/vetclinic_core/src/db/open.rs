//! Per-connection setup for pooled SQLite connections.
//!
//! # Responsibility
//! - Build the `r2d2` connection manager for a file or in-memory database.
//! - Configure every connection the pool opens before it is handed out.
//!
//! # Invariants
//! - Connections have the pool's busy timeout applied.
//! - File connections run in WAL journal mode.
//! - Connections expose the `fold_key(text)` SQL function.

use super::pool::{DbLocation, PoolConfig};
use log::{debug, error};
use r2d2::CustomizeConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::time::{Duration, Instant};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub(crate) fn connection_manager(location: &DbLocation) -> SqliteConnectionManager {
    match location {
        DbLocation::File { path } => SqliteConnectionManager::file(path),
        DbLocation::Memory => SqliteConnectionManager::memory(),
    }
}

/// Applies clinic connection settings each time the pool opens a connection.
#[derive(Debug, Clone)]
pub(crate) struct ClinicConnectionSetup {
    busy_timeout: Duration,
    wal: bool,
    mode: &'static str,
}

impl ClinicConnectionSetup {
    pub(crate) fn new(config: &PoolConfig) -> Self {
        Self {
            busy_timeout: config.busy_timeout(),
            wal: matches!(config.location, DbLocation::File { .. }),
            mode: config.location.mode(),
        }
    }

    fn configure(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.busy_timeout(self.busy_timeout)?;
        if self.wal {
            let _mode: String =
                conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        }
        register_fold_key(conn)
    }
}

impl CustomizeConnection<Connection, rusqlite::Error> for ClinicConnectionSetup {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        let started_at = Instant::now();
        match self.configure(conn) {
            Ok(()) => {
                debug!(
                    "event=db_connect module=db status=ok mode={} duration_ms={}",
                    self.mode,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=db_connect module=db status=error mode={} duration_ms={} error_code=db_configure_failed error={}",
                    self.mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Comparison key used for search and name ordering: lowercase, with
/// accents and other combining marks removed ("Álvaro" -> "alvaro").
pub(crate) fn fold_key(text: &str) -> String {
    text.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Registers `fold_key(text)`. SQLite's own `lower()` and `LIKE` only fold
/// ASCII letters and never ignore accents.
fn register_fold_key(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_key",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| fold_key(&text)))
        },
    )
}
