//! Repository layer: the shared store contract and its SQLite stores.
//!
//! # Responsibility
//! - Define one CRUD/search/count/paginate contract implemented by every
//!   entity store.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - `create` and `update` return the row as re-read from storage, never
//!   the caller's input.
//! - `update` never inserts; a missing id is `RepoError::NotFound`.
//! - Listing, search and pagination share one canonical order per entity.
//! - Stores check no foreign keys and cascade no deletes.

pub mod error;
pub mod medical_record_repo;
pub mod owner_repo;
pub mod pagination;
pub mod pet_repo;
mod sql_store;

use crate::model::EntityId;
use error::RepoResult;
use pagination::{BrowseQuery, Page, PageRequest};

/// Contract shared by the owner, pet and medical record stores.
pub trait Repository {
    type Entity;
    /// Input accepted by `create`.
    type NewEntity;
    /// Input accepted by `update`.
    type Changes;

    /// Exact lookup by primary key.
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Self::Entity>>;

    /// Every row in canonical order.
    fn find_all(&self) -> RepoResult<Vec<Self::Entity>>;

    /// Inserts a row and returns it as re-read from storage.
    fn create(&self, fields: &Self::NewEntity) -> RepoResult<Self::Entity>;

    /// Overwrites the mutable fields of row `id` and returns the re-read row.
    fn update(&self, id: EntityId, changes: &Self::Changes) -> RepoResult<Self::Entity>;

    /// Hard-deletes row `id`. Returns whether a row was removed.
    fn delete(&self, id: EntityId) -> RepoResult<bool>;

    /// Case- and accent-insensitive substring match over the entity's two search
    /// columns, in canonical order.
    ///
    /// Blank terms are rejected by callers; passed through, an empty term
    /// matches every row.
    fn search_by_term(&self, term: &str) -> RepoResult<Vec<Self::Entity>>;

    fn count(&self) -> RepoResult<u64>;

    fn paginate(&self, request: PageRequest) -> RepoResult<Page<Self::Entity>>;

    /// Listing entry point that always answers with an envelope: a
    /// non-blank search term returns every match as one page, otherwise the
    /// raw page/limit values are normalized and paginated.
    fn browse(&self, query: &BrowseQuery) -> RepoResult<Page<Self::Entity>> {
        let request = query.page_request();
        match query.search_term() {
            Some(term) => {
                let items = self.search_by_term(term)?;
                Ok(Page::single(items, request.limit()))
            }
            None => self.paginate(request),
        }
    }
}
