//! Store error taxonomy.
//!
//! # Invariants
//! - Stores never swallow a failure; the underlying `DbError` stays
//!   reachable through `Error::source`.
//! - UNIQUE / PRIMARY KEY violations are reported as `DuplicateEntry`, every
//!   other SQLite fault as `Storage`.

use crate::db::DbError;
use crate::model::attention_date::InvalidDateError;
use crate::model::{EntityId, EntityKind};
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store operation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FindAll,
    FindById,
    Create,
    Update,
    Delete,
    Search,
    Count,
    Paginate,
}

impl StoreOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindAll => "find_all",
            Self::FindById => "find_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Count => "count",
            Self::Paginate => "paginate",
        }
    }

    /// Human-readable failure summary, e.g. "failed to create pet".
    pub fn failure_message(self, entity: EntityKind) -> String {
        match self {
            Self::FindAll => format!("failed to list {}", entity.plural()),
            Self::FindById => format!("failed to find {entity} by id"),
            Self::Create => format!("failed to create {entity}"),
            Self::Update => format!("failed to update {entity}"),
            Self::Delete => format!("failed to delete {entity}"),
            Self::Search => format!("failed to search {}", entity.plural()),
            Self::Count => format!("failed to count {}", entity.plural()),
            Self::Paginate => format!("failed to paginate {}", entity.plural()),
        }
    }
}

impl Display for StoreOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification shared with the validation and transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    /// Malformed input caught before a store is called. Never produced by
    /// the stores themselves.
    ValidationFailure,
    DuplicateEntry,
    InvalidDate,
    StorageFailure,
}

impl ErrorKind {
    /// Suggested HTTP status for the transport layer.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::ValidationFailure => 400,
            Self::DuplicateEntry => 409,
            Self::InvalidDate => 400,
            Self::StorageFailure => 500,
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    NotFound {
        entity: EntityKind,
        id: EntityId,
    },
    DuplicateEntry {
        entity: EntityKind,
        op: StoreOp,
        source: DbError,
    },
    InvalidDate(InvalidDateError),
    /// A stored row could not be mapped into its record type.
    InvalidData(String),
    Storage {
        entity: EntityKind,
        op: StoreOp,
        source: DbError,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
            Self::InvalidDate(_) => ErrorKind::InvalidDate,
            Self::InvalidData(_) | Self::Storage { .. } => ErrorKind::StorageFailure,
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }

    /// Tags a database failure with the store and operation it came from.
    pub(crate) fn from_db(entity: EntityKind, op: StoreOp, err: DbError) -> Self {
        if err.as_sqlite().is_some_and(is_duplicate_key) {
            return Self::DuplicateEntry {
                entity,
                op,
                source: err,
            };
        }
        if err.as_sqlite().is_some_and(is_unmappable_value) {
            return Self::InvalidData(format!("{}: {err}", op.failure_message(entity)));
        }
        Self::Storage {
            entity,
            op,
            source: err,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateEntry { entity, op, .. } => {
                write!(f, "duplicate entry: {}", op.failure_message(*entity))
            }
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Storage { entity, op, .. } => f.write_str(&op.failure_message(*entity)),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::DuplicateEntry { source, .. } => Some(source),
            Self::InvalidDate(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Storage { source, .. } => Some(source),
        }
    }
}

impl From<InvalidDateError> for RepoError {
    fn from(value: InvalidDateError) -> Self {
        Self::InvalidDate(value)
    }
}

fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.extended_code,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

fn is_unmappable_value(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
    )
}
