//! Connection handling and query helpers shared by the SQLite stores.
//!
//! Every store operation goes through [`SqlStore::run`]: one pooled
//! connection is checked out for the closure and returned when it ends,
//! whatever the outcome. Failures are tagged with entity and operation and
//! logged once here.

use crate::db::{DbError, DbPool};
use crate::logging::sanitize_message;
use crate::model::{EntityId, EntityKind};
use crate::repo::error::{RepoError, RepoResult, StoreOp};
use crate::repo::pagination::{Page, PageRequest, PaginationInfo};
use log::{debug, error};
use rusqlite::{params, Connection, Params, Row};
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 240;

pub(crate) type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

/// Statements one store needs beyond its own INSERT/UPDATE.
pub(crate) struct TableQueries {
    pub select_by_id: String,
    pub select_all: String,
    pub select_page: String,
    pub search: String,
    pub count: String,
    pub delete: String,
}

pub(crate) struct SqlStore<'pool> {
    pool: &'pool DbPool,
    entity: EntityKind,
}

impl<'pool> SqlStore<'pool> {
    pub(crate) fn new(pool: &'pool DbPool, entity: EntityKind) -> Self {
        Self { pool, entity }
    }

    /// Runs `action` on a pooled connection and tags any failure.
    pub(crate) fn run<T>(
        &self,
        op: StoreOp,
        action: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let outcome = self
            .pool
            .get()
            .and_then(|conn| action(&conn).map_err(DbError::from));

        match outcome {
            Ok(value) => {
                debug!(
                    "event=store_op module=repo status=ok entity={} op={} duration_ms={}",
                    self.entity.as_str(),
                    op,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event=store_op module=repo status=error entity={} op={} duration_ms={} error={}",
                    self.entity.as_str(),
                    op,
                    started_at.elapsed().as_millis(),
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                Err(RepoError::from_db(self.entity, op, err))
            }
        }
    }

    pub(crate) fn fetch_by_id<T>(
        &self,
        op: StoreOp,
        queries: &TableQueries,
        id: EntityId,
        map: RowMapper<T>,
    ) -> RepoResult<Option<T>> {
        self.run(op, |conn| {
            let mut rows = query_rows(conn, &queries.select_by_id, [id], map)?;
            Ok(rows.pop())
        })
    }

    /// Re-reads a row just written by `op`. A row that vanished in between
    /// (concurrent delete) is reported as not found.
    pub(crate) fn reread<T>(
        &self,
        op: StoreOp,
        queries: &TableQueries,
        id: EntityId,
        map: RowMapper<T>,
    ) -> RepoResult<T> {
        self.fetch_by_id(op, queries, id, map)?
            .ok_or_else(|| RepoError::not_found(self.entity, id))
    }

    pub(crate) fn fetch_all<T>(
        &self,
        queries: &TableQueries,
        map: RowMapper<T>,
    ) -> RepoResult<Vec<T>> {
        self.run(StoreOp::FindAll, |conn| {
            query_rows(conn, &queries.select_all, [], map)
        })
    }

    /// Rows matching a caller-specific filter, e.g. all pets of one owner.
    pub(crate) fn fetch_where<T, P: Params>(
        &self,
        sql: &str,
        params: P,
        map: RowMapper<T>,
    ) -> RepoResult<Vec<T>> {
        self.run(StoreOp::FindAll, |conn| query_rows(conn, sql, params, map))
    }

    pub(crate) fn search<T>(
        &self,
        queries: &TableQueries,
        term: &str,
        map: RowMapper<T>,
    ) -> RepoResult<Vec<T>> {
        self.run(StoreOp::Search, |conn| {
            query_rows(conn, &queries.search, [term], map)
        })
    }

    pub(crate) fn count(&self, queries: &TableQueries) -> RepoResult<u64> {
        self.run(StoreOp::Count, |conn| count_rows(conn, &queries.count))
    }

    pub(crate) fn delete(&self, queries: &TableQueries, id: EntityId) -> RepoResult<bool> {
        let removed = self.run(StoreOp::Delete, |conn| {
            conn.execute(&queries.delete, [id])
        })?;
        Ok(removed > 0)
    }

    /// Fetches one page in canonical order, then the total row count, on
    /// the same connection.
    pub(crate) fn paginate<T>(
        &self,
        queries: &TableQueries,
        request: PageRequest,
        map: RowMapper<T>,
    ) -> RepoResult<Page<T>> {
        let limit = i64::from(request.limit());
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        self.run(StoreOp::Paginate, |conn| {
            let items = query_rows(conn, &queries.select_page, params![limit, offset], map)?;
            let total = count_rows(conn, &queries.count)?;
            Ok(Page::new(items, PaginationInfo::new(request, total)))
        })
    }
}

fn query_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: RowMapper<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(map(row)?);
    }
    Ok(items)
}

fn count_rows(conn: &Connection, sql: &str) -> rusqlite::Result<u64> {
    let total: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or_default())
}

/// Builds the shared statements for a table.
///
/// `search_columns` are matched ignoring case and accents as substrings of the
/// single bound term; `order_by` is the canonical order used by every
/// listing statement.
pub(crate) fn table_queries(
    select: &str,
    table: &str,
    search_columns: [&str; 2],
    order_by: &str,
) -> TableQueries {
    let [first, second] = search_columns;
    TableQueries {
        select_by_id: format!("{select} WHERE id = ?1;"),
        select_all: format!("{select} ORDER BY {order_by};"),
        select_page: format!("{select} ORDER BY {order_by} LIMIT ?1 OFFSET ?2;"),
        search: format!(
            "{select}
             WHERE instr(fold_key({first}), fold_key(?1)) > 0
                OR instr(fold_key({second}), fold_key(?1)) > 0
             ORDER BY {order_by};"
        ),
        count: format!("SELECT COUNT(*) FROM {table};"),
        delete: format!("DELETE FROM {table} WHERE id = ?1;"),
    }
}
