//! Repository for the `battalions` table.

use sqlx::PgPool;
use pstats_core::scope::{GeoLevel, Location};
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::geography::{Battalion, CreateBattalion, UpdateBattalion};

const TABLE: &str = "battalions";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, range_id, name, code, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR range_id = $1) \
                        AND ($2::BOOL IS NULL OR active = $2) \
                        AND ($3::TEXT IS NULL OR name ILIKE $3 OR code ILIKE $3)";

/// Provides CRUD operations for battalions.
pub struct BattalionRepo;

impl BattalionRepo {
    /// Insert a new battalion, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBattalion) -> Result<Battalion, sqlx::Error> {
        let query = format!(
            "INSERT INTO battalions (range_id, name, code, active)
             VALUES ($1, $2, $3, COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Battalion>(&query)
            .bind(input.range_id)
            .bind(input.name.trim())
            .bind(&input.code)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a battalion by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Battalion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM battalions WHERE id = $1");
        sqlx::query_as::<_, Battalion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the full state / district / range path of a battalion.
    pub async fn find_location(pool: &PgPool, id: DbId) -> Result<Option<Location>, sqlx::Error> {
        let row = sqlx::query_as::<_, (DbId, DbId, DbId, DbId)>(
            "SELECT d.state_id, r.district_id, b.range_id, b.id
             FROM battalions b
             JOIN ranges r ON r.id = b.range_id
             JOIN districts d ON d.id = r.district_id
             WHERE b.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(state_id, district_id, range_id, battalion_id)| Location {
            state_id,
            district_id,
            range_id,
            battalion_id,
        }))
    }

    /// List battalions, optionally within one range, ordered by name.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<Battalion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM battalions {FILTER} ORDER BY name ASC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Battalion>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Count battalions matching the same filter as [`BattalionRepo::list`].
    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM battalions {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a battalion. Only non-`None` fields in `input` are applied.
    ///
    /// Moving it to another range rewrites the ancestor ids copied onto
    /// its statistics and user scopes in the same transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBattalion,
    ) -> Result<Option<Battalion>, sqlx::Error> {
        let query = format!(
            "UPDATE battalions SET
                range_id = COALESCE($2, range_id),
                name = COALESCE($3, name),
                code = COALESCE($4, code)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, Battalion>(&query)
            .bind(id)
            .bind(input.range_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.code)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_some() && input.range_id.is_some() {
            common::refresh_geo_ancestors(&mut *tx, GeoLevel::Battalion, id).await?;
        }
        tx.commit().await?;
        Ok(updated)
    }

    /// Activate or deactivate a battalion. Returns `true` if the row exists.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of statistics and users that reference the battalion.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let statistics =
            common::count_referencing(pool, "performance_statistics", "battalion_id", id).await?;
        let users = common::count_referencing(pool, "users", "battalion_id", id).await?;
        Ok(statistics + users)
    }

    /// Permanently delete a battalion. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    /// Total / active / inactive counts.
    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
