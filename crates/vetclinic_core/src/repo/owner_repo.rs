//! Owner store.
//!
//! # Invariants
//! - Canonical order: first name ignoring case and accents, then id.
//! - Search matches first name or last name.
//! - `national_id` is unique at the table level; reuse is `DuplicateEntry`.

use crate::db::DbPool;
use crate::model::owner::{Owner, OwnerFields};
use crate::model::{EntityId, EntityKind};
use crate::repo::error::{RepoError, RepoResult, StoreOp};
use crate::repo::pagination::{Page, PageRequest};
use crate::repo::sql_store::{table_queries, SqlStore, TableQueries};
use crate::repo::Repository;
use rusqlite::{params, Row};

const OWNER_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    national_id,
    phone,
    email
FROM owners";

const OWNER_ORDER_SQL: &str = "fold_key(first_name) ASC, id ASC";

/// SQLite-backed owner store.
pub struct SqliteOwnerRepository<'pool> {
    store: SqlStore<'pool>,
    queries: TableQueries,
}

impl<'pool> SqliteOwnerRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self {
            store: SqlStore::new(pool, EntityKind::Owner),
            queries: table_queries(
                OWNER_SELECT_SQL,
                "owners",
                ["first_name", "last_name"],
                OWNER_ORDER_SQL,
            ),
        }
    }
}

impl Repository for SqliteOwnerRepository<'_> {
    type Entity = Owner;
    type NewEntity = OwnerFields;
    type Changes = OwnerFields;

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Owner>> {
        self.store
            .fetch_by_id(StoreOp::FindById, &self.queries, id, parse_owner_row)
    }

    fn find_all(&self) -> RepoResult<Vec<Owner>> {
        self.store.fetch_all(&self.queries, parse_owner_row)
    }

    fn create(&self, fields: &OwnerFields) -> RepoResult<Owner> {
        let id = self.store.run(StoreOp::Create, |conn| {
            conn.execute(
                "INSERT INTO owners (
                    first_name,
                    last_name,
                    national_id,
                    phone,
                    email
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    fields.first_name,
                    fields.last_name,
                    fields.national_id,
                    fields.phone,
                    fields.email,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        self.store
            .reread(StoreOp::Create, &self.queries, id, parse_owner_row)
    }

    fn update(&self, id: EntityId, changes: &OwnerFields) -> RepoResult<Owner> {
        let changed = self.store.run(StoreOp::Update, |conn| {
            conn.execute(
                "UPDATE owners
                 SET
                    first_name = ?1,
                    last_name = ?2,
                    national_id = ?3,
                    phone = ?4,
                    email = ?5
                 WHERE id = ?6;",
                params![
                    changes.first_name,
                    changes.last_name,
                    changes.national_id,
                    changes.phone,
                    changes.email,
                    id,
                ],
            )
        })?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Owner, id));
        }

        self.store
            .reread(StoreOp::Update, &self.queries, id, parse_owner_row)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.store.delete(&self.queries, id)
    }

    fn search_by_term(&self, term: &str) -> RepoResult<Vec<Owner>> {
        self.store.search(&self.queries, term, parse_owner_row)
    }

    fn count(&self) -> RepoResult<u64> {
        self.store.count(&self.queries)
    }

    fn paginate(&self, request: PageRequest) -> RepoResult<Page<Owner>> {
        self.store.paginate(&self.queries, request, parse_owner_row)
    }
}

fn parse_owner_row(row: &Row<'_>) -> rusqlite::Result<Owner> {
    Ok(Owner {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        national_id: row.get("national_id")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
    })
}
