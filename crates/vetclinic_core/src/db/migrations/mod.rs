//! Embedded clinic schema migrations.
//!
//! Migrations are plain SQL files compiled into the binary and applied in
//! version order inside a single transaction. The applied version lives in
//! `PRAGMA user_version`, so a fresh database reads as version 0.
//!
//! The schema declares no `REFERENCES` clauses: owner and pet ids are stored
//! verbatim and never checked against their parent table.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct ClinicMigration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const CLINIC_MIGRATIONS: &[ClinicMigration] = &[ClinicMigration {
    version: 1,
    name: "clinic_init",
    sql: include_str!("0001_clinic_init.sql"),
}];

/// What `apply_migrations` did to one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the migrations applied, in order. Empty when up to date.
    pub applied: Vec<&'static str>,
}

/// Schema version this binary migrates databases up to.
pub fn latest_version() -> u32 {
    CLINIC_MIGRATIONS
        .last()
        .map_or(0, |migration| migration.version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database was written by a newer
///   binary; nothing is changed in that case.
/// - `Sqlite` when a migration fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationOutcome> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = CLINIC_MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(MigrationOutcome {
            from_version,
            to_version: from_version,
            applied: Vec::new(),
        });
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=ok name={} version={}",
            migration.name, migration.version
        );
    }
    tx.commit()?;

    Ok(MigrationOutcome {
        from_version,
        to_version: latest,
        applied: pending.iter().map(|migration| migration.name).collect(),
    })
}

/// Schema version recorded in the database header.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
