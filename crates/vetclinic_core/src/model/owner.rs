//! Owner record.

use super::EntityId;
use serde::{Deserialize, Serialize};

pub type OwnerId = EntityId;

/// A pet owner as stored in the `owners` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: OwnerId,
    pub first_name: String,
    pub last_name: String,
    /// National identity document number. Unique across owners.
    pub national_id: String,
    pub phone: String,
    pub email: String,
}

impl Owner {
    /// Returns the mutable fields, e.g. to feed a modified copy to `update`.
    pub fn fields(&self) -> OwnerFields {
        OwnerFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            national_id: self.national_id.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

/// Caller-supplied owner attributes for create and full-overwrite update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFields {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
}

impl OwnerFields {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id: national_id.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }
}
