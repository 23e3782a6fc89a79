//! Repository for the `modules` table.

use sqlx::PgPool;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::content::{CreateModule, Module, UpdateModule};

const TABLE: &str = "modules";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, sort_order, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BOOL IS NULL OR active = $1) \
                        AND ($2::TEXT IS NULL OR name ILIKE $2)";

/// Provides CRUD operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a new module, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateModule) -> Result<Module, sqlx::Error> {
        let query = format!(
            "INSERT INTO modules (name, description, sort_order, active)
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a module by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List modules in display order.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules {FILTER} \
             ORDER BY sort_order ASC, name ASC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Count modules matching the same filter as [`ModuleRepo::list`].
    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM modules {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a module. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateModule,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "UPDATE modules SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                sort_order = COALESCE($4, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of topics under the module.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "topics", "module_id", id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
