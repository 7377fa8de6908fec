//! Clinic database pool on top of `r2d2`.
//!
//! # Responsibility
//! - Own every connection to one clinic database.
//! - Check connections out per store operation and take them back on drop.
//! - Apply the pool's acquire timeout; stores impose no timeout of their own.
//!
//! # Invariants
//! - Migrations run once, on the first checkout, before the pool is usable.
//! - At most `max_connections` connections exist at any time.
//! - In-memory databases are private to one connection, so a memory pool
//!   holds exactly one connection and never recycles it.

use super::migrations::apply_migrations;
use super::open::{connection_manager, ClinicConnectionSetup};
use super::{DbError, DbResult};
use log::{error, info, warn};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 30_000;

/// Where the clinic database lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DbLocation {
    File { path: PathBuf },
    Memory,
}

impl DbLocation {
    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Memory => "memory",
        }
    }
}

/// Pool settings. Every field has a default so partial config documents
/// deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub location: DbLocation,
    pub max_connections: u32,
    /// How long a connection waits on a locked database file.
    pub busy_timeout_ms: u64,
    /// How long `DbPool::get` waits for a free connection.
    pub acquire_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            location: DbLocation::Memory,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
        }
    }
}

impl PoolConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File { path: path.into() },
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    fn effective_max_connections(&self) -> DbResult<u32> {
        if self.max_connections == 0 {
            return Err(DbError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(DbError::InvalidConfig(
                "acquire_timeout_ms must be at least 1".to_string(),
            ));
        }
        match self.location {
            DbLocation::Memory => Ok(1),
            DbLocation::File { .. } => Ok(self.max_connections),
        }
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub open: usize,
    pub idle: usize,
    pub max: usize,
}

/// Connection checked out of a [`DbPool`]; returned to the pool on drop.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Shared pool of configured, migrated SQLite connections.
pub struct DbPool {
    config: PoolConfig,
    inner: Pool<SqliteConnectionManager>,
}

impl DbPool {
    /// Builds the pool, applies pending migrations on its first connection,
    /// and returns it ready for store operations.
    ///
    /// # Errors
    /// - `InvalidConfig` when `max_connections` or the acquire timeout is zero.
    /// - `PoolTimeout` when no configured connection could be opened in time.
    /// - `UnsupportedSchemaVersion` when the database is newer than this binary.
    /// - `Sqlite` when a migration fails.
    pub fn open(config: PoolConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        let max_connections = config.effective_max_connections()?;
        let mode = config.location.mode();
        info!("event=pool_open module=db status=start mode={mode} max_connections={max_connections}");

        let mut builder = Pool::builder()
            .max_size(max_connections)
            .min_idle(Some(0))
            .connection_timeout(config.acquire_timeout())
            .connection_customizer(Box::new(ClinicConnectionSetup::new(&config)));
        if config.location == DbLocation::Memory {
            builder = builder.idle_timeout(None).max_lifetime(None);
        }

        let bootstrap = builder
            .build(connection_manager(&config.location))
            .map_err(|source| DbError::PoolTimeout {
                waited: config.acquire_timeout(),
                source,
            })
            .and_then(|inner| {
                let outcome = {
                    let mut conn = inner.get().map_err(|source| DbError::PoolTimeout {
                        waited: config.acquire_timeout(),
                        source,
                    })?;
                    apply_migrations(&mut conn)?
                };
                Ok((inner, outcome))
            });
        let (inner, outcome) = match bootstrap {
            Ok(opened) => opened,
            Err(err) => {
                error!(
                    "event=pool_open module=db status=error mode={} duration_ms={} error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=pool_open module=db status=ok mode={} schema_version={} migrations_applied={} duration_ms={}",
            mode,
            outcome.to_version,
            outcome.applied.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Self { config, inner })
    }

    /// Opens a private in-memory database with default settings.
    pub fn in_memory() -> DbResult<Self> {
        Self::open(PoolConfig::in_memory())
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.inner.state();
        PoolStatus {
            open: state.connections as usize,
            idle: state.idle_connections as usize,
            max: self.inner.max_size() as usize,
        }
    }

    /// Checks out a connection, waiting up to the configured acquire
    /// timeout when every connection is in use.
    pub fn get(&self) -> DbResult<PooledConnection> {
        self.inner.get().map_err(|source| {
            let waited = self.config.acquire_timeout();
            warn!(
                "event=pool_acquire module=db status=error error_code=pool_timeout waited_ms={} max_connections={} error={}",
                waited.as_millis(),
                self.inner.max_size(),
                source
            );
            DbError::PoolTimeout { waited, source }
        })
    }
}
