//! Pet record.

use super::owner::OwnerId;
use super::EntityId;
use serde::{Deserialize, Serialize};

pub type PetId = EntityId;

/// A pet as stored in the `pets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    /// Owner reference, stored verbatim. May point at a deleted owner.
    pub owner_id: OwnerId,
    pub name: String,
    pub breed: String,
    /// Free text ("3", "8 months", ...), never parsed as a number.
    pub age: String,
}

impl Pet {
    pub fn fields(&self) -> PetFields {
        PetFields {
            owner_id: self.owner_id,
            name: self.name.clone(),
            breed: self.breed.clone(),
            age: self.age.clone(),
        }
    }
}

/// Caller-supplied pet attributes for create and full-overwrite update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetFields {
    pub owner_id: OwnerId,
    pub name: String,
    pub breed: String,
    pub age: String,
}

impl PetFields {
    pub fn new(
        owner_id: OwnerId,
        name: impl Into<String>,
        breed: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            name: name.into(),
            breed: breed.into(),
            age: age.into(),
        }
    }
}
