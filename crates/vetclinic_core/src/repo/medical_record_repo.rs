//! Medical record store.
//!
//! # Responsibility
//! - Persist visit records with a canonical attention date.
//! - Own the "keep the stored date" default on update.
//!
//! # Invariants
//! - Canonical order: attention date descending, then id descending.
//! - Search matches reason or diagnosis.
//! - Date input is normalized before any statement runs; an invalid date
//!   never reaches the table.
//! - `pet_id` is written as given; the pet may not exist.

use crate::db::DbPool;
use crate::model::attention_date::{AttentionDate, DateInput, CANONICAL_FORMAT};
use crate::model::medical_record::{MedicalRecord, MedicalRecordChanges, NewMedicalRecord};
use crate::model::{EntityId, EntityKind};
use crate::repo::error::{RepoError, RepoResult, StoreOp};
use crate::repo::pagination::{Page, PageRequest};
use crate::repo::sql_store::{table_queries, SqlStore, TableQueries};
use crate::repo::Repository;
use chrono::NaiveDateTime;
use log::warn;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Row, ToSql};

const MEDICAL_RECORD_SELECT_SQL: &str = "SELECT
    id,
    pet_id,
    attention_date,
    reason,
    diagnosis
FROM medical_records";

const MEDICAL_RECORD_ORDER_SQL: &str = "attention_date DESC, id DESC";

/// SQLite-backed medical record store.
pub struct SqliteMedicalRecordRepository<'pool> {
    store: SqlStore<'pool>,
    queries: TableQueries,
}

impl<'pool> SqliteMedicalRecordRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self {
            store: SqlStore::new(pool, EntityKind::MedicalRecord),
            queries: table_queries(
                MEDICAL_RECORD_SELECT_SQL,
                "medical_records",
                ["reason", "diagnosis"],
                MEDICAL_RECORD_ORDER_SQL,
            ),
        }
    }

    /// Visit history of one pet, most recent first.
    pub fn find_by_pet(&self, pet_id: EntityId) -> RepoResult<Vec<MedicalRecord>> {
        let sql = format!(
            "{MEDICAL_RECORD_SELECT_SQL} WHERE pet_id = ?1 ORDER BY {MEDICAL_RECORD_ORDER_SQL};"
        );
        self.store
            .fetch_where(&sql, [pet_id], parse_medical_record_row)
    }
}

impl Repository for SqliteMedicalRecordRepository<'_> {
    type Entity = MedicalRecord;
    type NewEntity = NewMedicalRecord;
    type Changes = MedicalRecordChanges;

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<MedicalRecord>> {
        self.store.fetch_by_id(
            StoreOp::FindById,
            &self.queries,
            id,
            parse_medical_record_row,
        )
    }

    fn find_all(&self) -> RepoResult<Vec<MedicalRecord>> {
        self.store.fetch_all(&self.queries, parse_medical_record_row)
    }

    fn create(&self, fields: &NewMedicalRecord) -> RepoResult<MedicalRecord> {
        let attention_date = match fields.attention_date.as_ref() {
            Some(input) => normalize_input(input, StoreOp::Create)?,
            None => AttentionDate::now(),
        };

        let id = self.store.run(StoreOp::Create, |conn| {
            conn.execute(
                "INSERT INTO medical_records (
                    pet_id,
                    attention_date,
                    reason,
                    diagnosis
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    fields.pet_id,
                    attention_date,
                    fields.reason,
                    fields.diagnosis,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        self.store.reread(
            StoreOp::Create,
            &self.queries,
            id,
            parse_medical_record_row,
        )
    }

    /// Overwrites pet, reason and diagnosis. The attention date is replaced
    /// only when `changes.attention_date` is set; otherwise the stored value
    /// is kept by the UPDATE statement itself.
    fn update(
        &self,
        id: EntityId,
        changes: &MedicalRecordChanges,
    ) -> RepoResult<MedicalRecord> {
        let attention_date = changes
            .attention_date
            .as_ref()
            .map(|input| normalize_input(input, StoreOp::Update))
            .transpose()?;

        let changed = self.store.run(StoreOp::Update, |conn| {
            conn.execute(
                "UPDATE medical_records
                 SET
                    pet_id = ?1,
                    attention_date = COALESCE(?2, attention_date),
                    reason = ?3,
                    diagnosis = ?4
                 WHERE id = ?5;",
                params![
                    changes.pet_id,
                    attention_date,
                    changes.reason,
                    changes.diagnosis,
                    id,
                ],
            )
        })?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::MedicalRecord, id));
        }

        self.store.reread(
            StoreOp::Update,
            &self.queries,
            id,
            parse_medical_record_row,
        )
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.store.delete(&self.queries, id)
    }

    fn search_by_term(&self, term: &str) -> RepoResult<Vec<MedicalRecord>> {
        self.store
            .search(&self.queries, term, parse_medical_record_row)
    }

    fn count(&self) -> RepoResult<u64> {
        self.store.count(&self.queries)
    }

    fn paginate(&self, request: PageRequest) -> RepoResult<Page<MedicalRecord>> {
        self.store
            .paginate(&self.queries, request, parse_medical_record_row)
    }
}

fn normalize_input(input: &DateInput, op: StoreOp) -> RepoResult<AttentionDate> {
    input.normalize().map_err(|err| {
        warn!(
            "event=store_op module=repo status=rejected entity={} op={} error_code=invalid_date",
            EntityKind::MedicalRecord.as_str(),
            op
        );
        RepoError::from(err)
    })
}

fn parse_medical_record_row(row: &Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: row.get("id")?,
        pet_id: row.get("pet_id")?,
        attention_date: row.get("attention_date")?,
        reason: row.get("reason")?,
        diagnosis: row.get("diagnosis")?,
    })
}

impl ToSql for AttentionDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_canonical()))
    }
}

/// Reads only the canonical form; anything else in the column is corrupt.
impl FromSql for AttentionDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        NaiveDateTime::parse_from_str(text, CANONICAL_FORMAT)
            .map(AttentionDate::from_naive)
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
