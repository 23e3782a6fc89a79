//! Repository for the `states` table.

use sqlx::PgPool;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::geography::{CreateState, State, UpdateState};

const TABLE: &str = "states";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, code, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BOOL IS NULL OR active = $1) \
                        AND ($2::TEXT IS NULL OR name ILIKE $2 OR code ILIKE $2)";

/// Provides CRUD operations for states.
pub struct StateRepo;

impl StateRepo {
    /// Insert a new state, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateState) -> Result<State, sqlx::Error> {
        let query = format!(
            "INSERT INTO states (name, code, active)
             VALUES ($1, $2, COALESCE($3, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, State>(&query)
            .bind(input.name.trim())
            .bind(&input.code)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a state by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<State>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM states WHERE id = $1");
        sqlx::query_as::<_, State>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List states ordered by name.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<State>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM states {FILTER} ORDER BY name ASC LIMIT $3 OFFSET $4");
        sqlx::query_as::<_, State>(&query)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Count states matching the same filter as [`StateRepo::list`].
    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM states {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a state. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateState,
    ) -> Result<Option<State>, sqlx::Error> {
        let query = format!(
            "UPDATE states SET
                name = COALESCE($2, name),
                code = COALESCE($3, code)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, State>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.code)
            .fetch_optional(pool)
            .await
    }

    /// Activate or deactivate a state. Returns `true` if the row exists.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of districts that belong to the state.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "districts", "state_id", id).await
    }

    /// Permanently delete a state. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    /// Total / active / inactive counts.
    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
