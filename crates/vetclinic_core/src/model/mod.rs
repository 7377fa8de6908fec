//! Clinic domain model.
//!
//! # Responsibility
//! - Define the typed records returned by the stores.
//! - Define the field sets callers hand to create/update.
//!
//! # Invariants
//! - Every entity is identified by a store-assigned `EntityId` that never
//!   changes and is never reused.
//! - Parent references (`owner_id`, `pet_id`) are plain values; nothing in
//!   the model or the stores checks that the parent exists.

use std::fmt::{Display, Formatter};

pub mod attention_date;
pub mod medical_record;
pub mod owner;
pub mod pet;

/// Store-assigned row identifier shared by every entity.
pub type EntityId = i64;

/// Which store an id, error, or log event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Owner,
    Pet,
    MedicalRecord,
}

impl EntityKind {
    /// Stable snake_case token used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Pet => "pet",
            Self::MedicalRecord => "medical_record",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Owner => "owners",
            Self::Pet => "pets",
            Self::MedicalRecord => "medical records",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Owner => "owner",
            Self::Pet => "pet",
            Self::MedicalRecord => "medical record",
        };
        f.write_str(label)
    }
}
