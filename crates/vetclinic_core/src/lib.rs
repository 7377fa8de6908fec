//! Core data-management layer for a veterinary clinic.
//! Owners, their pets and each pet's medical records live behind one shared
//! store contract over a pooled SQLite database.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{DbError, DbLocation, DbPool, DbResult, PoolConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::attention_date::{AttentionDate, DateInput, InvalidDateError};
pub use model::medical_record::{MedicalRecord, MedicalRecordChanges, NewMedicalRecord};
pub use model::owner::{Owner, OwnerFields};
pub use model::pet::{Pet, PetFields};
pub use model::{EntityId, EntityKind};
pub use repo::error::{ErrorKind, RepoError, RepoResult, StoreOp};
pub use repo::medical_record_repo::SqliteMedicalRecordRepository;
pub use repo::owner_repo::SqliteOwnerRepository;
pub use repo::pagination::{BrowseQuery, Page, PageRequest, PaginationInfo, RawInteger};
pub use repo::pet_repo::SqlitePetRepository;
pub use repo::Repository;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
