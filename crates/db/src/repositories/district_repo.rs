//! Repository for the `districts` table.

use sqlx::PgPool;
use pstats_core::scope::GeoLevel;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::geography::{CreateDistrict, District, UpdateDistrict};

const TABLE: &str = "districts";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, state_id, name, code, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR state_id = $1) \
                        AND ($2::BOOL IS NULL OR active = $2) \
                        AND ($3::TEXT IS NULL OR name ILIKE $3 OR code ILIKE $3)";

/// Provides CRUD operations for districts.
pub struct DistrictRepo;

impl DistrictRepo {
    /// Insert a new district, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDistrict) -> Result<District, sqlx::Error> {
        let query = format!(
            "INSERT INTO districts (state_id, name, code, active)
             VALUES ($1, $2, $3, COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, District>(&query)
            .bind(input.state_id)
            .bind(input.name.trim())
            .bind(&input.code)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a district by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<District>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM districts WHERE id = $1");
        sqlx::query_as::<_, District>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List districts, optionally within one state, ordered by name.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<District>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM districts {FILTER} ORDER BY name ASC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, District>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Count districts matching the same filter as [`DistrictRepo::list`].
    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM districts {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a district. Only non-`None` fields in `input` are applied.
    ///
    /// Moving it to another state rewrites the ancestor ids copied onto
    /// its statistics and user scopes in the same transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDistrict,
    ) -> Result<Option<District>, sqlx::Error> {
        let query = format!(
            "UPDATE districts SET
                state_id = COALESCE($2, state_id),
                name = COALESCE($3, name),
                code = COALESCE($4, code)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, District>(&query)
            .bind(id)
            .bind(input.state_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.code)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_some() && input.state_id.is_some() {
            common::refresh_geo_ancestors(&mut *tx, GeoLevel::District, id).await?;
        }
        tx.commit().await?;
        Ok(updated)
    }

    /// Activate or deactivate a district. Returns `true` if the row exists.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of ranges that belong to the district.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "ranges", "district_id", id).await
    }

    /// Permanently delete a district. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    /// Total / active / inactive counts.
    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
