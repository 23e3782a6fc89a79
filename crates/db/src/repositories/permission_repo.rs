//! Repository for the `permissions` table.

use sqlx::PgPool;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::role::{CreatePermission, Permission, UpdatePermission};

const TABLE: &str = "permissions";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, description, menu_id, sub_menu_id, active, \
                       created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR menu_id = $1) \
                        AND ($2::BOOL IS NULL OR active = $2) \
                        AND ($3::TEXT IS NULL OR code ILIKE $3 OR name ILIKE $3)";

/// Provides CRUD operations for permissions.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Insert a new permission. `code` must already be normalised.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePermission,
    ) -> Result<Permission, sqlx::Error> {
        let query = format!(
            "INSERT INTO permissions (code, name, description, menu_id, sub_menu_id, active)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(&input.code)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.menu_id)
            .bind(input.sub_menu_id)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE id = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List permissions ordered by code.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM permissions {FILTER} \
             ORDER BY code ASC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM permissions {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Codes of the active permissions a user holds through active roles.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT p.code \
             FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id AND r.active = TRUE \
             JOIN role_permissions rp ON rp.role_id = r.id \
             JOIN permissions p ON p.id = rp.permission_id AND p.active = TRUE \
             WHERE ur.user_id = $1 \
             ORDER BY p.code ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update a permission. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePermission,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!(
            "UPDATE permissions SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                menu_id = COALESCE($5, menu_id),
                sub_menu_id = COALESCE($6, sub_menu_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.menu_id)
            .bind(input.sub_menu_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of roles granted the permission.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "role_permissions", "permission_id", id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
