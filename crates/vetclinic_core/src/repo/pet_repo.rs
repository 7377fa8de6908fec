//! Pet store.
//!
//! # Invariants
//! - Canonical order: name ignoring case and accents, then id.
//! - Search matches name or breed.
//! - `owner_id` is written as given; the owner may not exist.

use crate::db::DbPool;
use crate::model::pet::{Pet, PetFields};
use crate::model::{EntityId, EntityKind};
use crate::repo::error::{RepoError, RepoResult, StoreOp};
use crate::repo::pagination::{Page, PageRequest};
use crate::repo::sql_store::{table_queries, SqlStore, TableQueries};
use crate::repo::Repository;
use rusqlite::{params, Row};

const PET_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    name,
    breed,
    age
FROM pets";

const PET_ORDER_SQL: &str = "fold_key(name) ASC, id ASC";

/// SQLite-backed pet store.
pub struct SqlitePetRepository<'pool> {
    store: SqlStore<'pool>,
    queries: TableQueries,
}

impl<'pool> SqlitePetRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self {
            store: SqlStore::new(pool, EntityKind::Pet),
            queries: table_queries(PET_SELECT_SQL, "pets", ["name", "breed"], PET_ORDER_SQL),
        }
    }

    /// Pets referencing `owner_id`, in canonical order.
    pub fn find_by_owner(&self, owner_id: EntityId) -> RepoResult<Vec<Pet>> {
        let sql = format!("{PET_SELECT_SQL} WHERE owner_id = ?1 ORDER BY {PET_ORDER_SQL};");
        self.store.fetch_where(&sql, [owner_id], parse_pet_row)
    }
}

impl Repository for SqlitePetRepository<'_> {
    type Entity = Pet;
    type NewEntity = PetFields;
    type Changes = PetFields;

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Pet>> {
        self.store
            .fetch_by_id(StoreOp::FindById, &self.queries, id, parse_pet_row)
    }

    fn find_all(&self) -> RepoResult<Vec<Pet>> {
        self.store.fetch_all(&self.queries, parse_pet_row)
    }

    fn create(&self, fields: &PetFields) -> RepoResult<Pet> {
        let id = self.store.run(StoreOp::Create, |conn| {
            conn.execute(
                "INSERT INTO pets (owner_id, name, breed, age) VALUES (?1, ?2, ?3, ?4);",
                params![fields.owner_id, fields.name, fields.breed, fields.age],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        self.store
            .reread(StoreOp::Create, &self.queries, id, parse_pet_row)
    }

    fn update(&self, id: EntityId, changes: &PetFields) -> RepoResult<Pet> {
        let changed = self.store.run(StoreOp::Update, |conn| {
            conn.execute(
                "UPDATE pets
                 SET
                    owner_id = ?1,
                    name = ?2,
                    breed = ?3,
                    age = ?4
                 WHERE id = ?5;",
                params![changes.owner_id, changes.name, changes.breed, changes.age, id],
            )
        })?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Pet, id));
        }

        self.store
            .reread(StoreOp::Update, &self.queries, id, parse_pet_row)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.store.delete(&self.queries, id)
    }

    fn search_by_term(&self, term: &str) -> RepoResult<Vec<Pet>> {
        self.store.search(&self.queries, term, parse_pet_row)
    }

    fn count(&self) -> RepoResult<u64> {
        self.store.count(&self.queries)
    }

    fn paginate(&self, request: PageRequest) -> RepoResult<Page<Pet>> {
        self.store.paginate(&self.queries, request, parse_pet_row)
    }
}

fn parse_pet_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        breed: row.get("breed")?,
        age: row.get("age")?,
    })
}
