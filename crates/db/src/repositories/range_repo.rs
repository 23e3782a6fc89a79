//! Repository for the `ranges` table.

use sqlx::PgPool;
use pstats_core::scope::GeoLevel;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::geography::{CreateRange, Range, UpdateRange};

const TABLE: &str = "ranges";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, district_id, name, code, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR district_id = $1) \
                        AND ($2::BOOL IS NULL OR active = $2) \
                        AND ($3::TEXT IS NULL OR name ILIKE $3 OR code ILIKE $3)";

/// Provides CRUD operations for ranges.
pub struct RangeRepo;

impl RangeRepo {
    /// Insert a new range, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRange) -> Result<Range, sqlx::Error> {
        let query = format!(
            "INSERT INTO ranges (district_id, name, code, active)
             VALUES ($1, $2, $3, COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Range>(&query)
            .bind(input.district_id)
            .bind(input.name.trim())
            .bind(&input.code)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a range by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Range>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ranges WHERE id = $1");
        sqlx::query_as::<_, Range>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List ranges, optionally within one district, ordered by name.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<Range>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ranges {FILTER} ORDER BY name ASC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Range>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Count ranges matching the same filter as [`RangeRepo::list`].
    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM ranges {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a range. Only non-`None` fields in `input` are applied.
    ///
    /// Moving it to another district rewrites the ancestor ids copied onto
    /// its statistics and user scopes in the same transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRange,
    ) -> Result<Option<Range>, sqlx::Error> {
        let query = format!(
            "UPDATE ranges SET
                district_id = COALESCE($2, district_id),
                name = COALESCE($3, name),
                code = COALESCE($4, code)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, Range>(&query)
            .bind(id)
            .bind(input.district_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.code)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_some() && input.district_id.is_some() {
            common::refresh_geo_ancestors(&mut *tx, GeoLevel::Range, id).await?;
        }
        tx.commit().await?;
        Ok(updated)
    }

    /// Activate or deactivate a range. Returns `true` if the row exists.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of battalions that belong to the range.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "battalions", "range_id", id).await
    }

    /// Permanently delete a range. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    /// Total / active / inactive counts.
    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
