//! Medical visit record.

use super::attention_date::{AttentionDate, DateInput};
use super::pet::PetId;
use super::EntityId;
use serde::{Deserialize, Serialize};

pub type MedicalRecordId = EntityId;

/// Column limit of `medical_records.reason`, in characters.
pub const REASON_MAX_CHARS: usize = 500;
/// Column limit of `medical_records.diagnosis`, in characters.
pub const DIAGNOSIS_MAX_CHARS: usize = 2000;

/// One visit of one pet, as stored in `medical_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: MedicalRecordId,
    /// Pet reference, stored verbatim. May point at a deleted pet.
    pub pet_id: PetId,
    pub attention_date: AttentionDate,
    pub reason: String,
    pub diagnosis: String,
}

/// Input for creating a medical record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalRecord {
    pub pet_id: PetId,
    /// `None` records the visit at the moment of creation.
    #[serde(default)]
    pub attention_date: Option<DateInput>,
    pub reason: String,
    pub diagnosis: String,
}

impl NewMedicalRecord {
    pub fn new(pet_id: PetId, reason: impl Into<String>, diagnosis: impl Into<String>) -> Self {
        Self {
            pet_id,
            attention_date: None,
            reason: reason.into(),
            diagnosis: diagnosis.into(),
        }
    }

    pub fn attended_at(mut self, date: impl Into<DateInput>) -> Self {
        self.attention_date = Some(date.into());
        self
    }
}

/// Full-overwrite update for a medical record.
///
/// All fields are written except `attention_date`, where `None` keeps the
/// stored value. The store resolves that default itself; callers do not
/// need to read the row first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordChanges {
    pub pet_id: PetId,
    #[serde(default)]
    pub attention_date: Option<DateInput>,
    pub reason: String,
    pub diagnosis: String,
}

impl MedicalRecordChanges {
    pub fn new(pet_id: PetId, reason: impl Into<String>, diagnosis: impl Into<String>) -> Self {
        Self {
            pet_id,
            attention_date: None,
            reason: reason.into(),
            diagnosis: diagnosis.into(),
        }
    }

    pub fn attended_at(mut self, date: impl Into<DateInput>) -> Self {
        self.attention_date = Some(date.into());
        self
    }
}

impl From<&MedicalRecord> for MedicalRecordChanges {
    fn from(record: &MedicalRecord) -> Self {
        Self {
            pet_id: record.pet_id,
            attention_date: Some(record.attention_date.into()),
            reason: record.reason.clone(),
            diagnosis: record.diagnosis.clone(),
        }
    }
}
