//! Repository for the `sub_menus` table.

use sqlx::PgPool;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::menu::{CreateSubMenu, SubMenu, UpdateSubMenu};

const TABLE: &str = "sub_menus";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, menu_id, name, path, sort_order, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR menu_id = $1) \
                        AND ($2::BOOL IS NULL OR active = $2) \
                        AND ($3::TEXT IS NULL OR name ILIKE $3 OR path ILIKE $3)";

/// Provides CRUD operations for sub-menus.
pub struct SubMenuRepo;

impl SubMenuRepo {
    /// Insert a new sub-menu, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSubMenu) -> Result<SubMenu, sqlx::Error> {
        let query = format!(
            "INSERT INTO sub_menus (menu_id, name, path, sort_order, active)
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubMenu>(&query)
            .bind(input.menu_id)
            .bind(input.name.trim())
            .bind(input.path.trim())
            .bind(input.sort_order)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SubMenu>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sub_menus WHERE id = $1");
        sqlx::query_as::<_, SubMenu>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sub-menus, optionally within one menu, in display order.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<SubMenu>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sub_menus {FILTER} \
             ORDER BY menu_id ASC, sort_order ASC, name ASC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, SubMenu>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM sub_menus {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Active sub-menus of the given menus that the user reaches through a
    /// permission. A permission on the whole menu grants all of its sub-menus.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        menu_ids: &[DbId],
    ) -> Result<Vec<SubMenu>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sub_menus sm
             WHERE sm.active = TRUE
               AND sm.menu_id = ANY($2)
               AND EXISTS (
                   SELECT 1
                   FROM user_roles ur
                   JOIN roles r ON r.id = ur.role_id AND r.active = TRUE
                   JOIN role_permissions rp ON rp.role_id = r.id
                   JOIN permissions p ON p.id = rp.permission_id AND p.active = TRUE
                   WHERE ur.user_id = $1
                     AND (p.sub_menu_id = sm.id
                          OR (p.sub_menu_id IS NULL AND p.menu_id = sm.menu_id))
               )
             ORDER BY sm.menu_id ASC, sm.sort_order ASC, sm.name ASC"
        );
        sqlx::query_as::<_, SubMenu>(&query)
            .bind(user_id)
            .bind(menu_ids)
            .fetch_all(pool)
            .await
    }

    /// Update a sub-menu. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubMenu,
    ) -> Result<Option<SubMenu>, sqlx::Error> {
        let query = format!(
            "UPDATE sub_menus SET
                menu_id = COALESCE($2, menu_id),
                name = COALESCE($3, name),
                path = COALESCE($4, path),
                sort_order = COALESCE($5, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubMenu>(&query)
            .bind(id)
            .bind(input.menu_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.path.as_deref().map(str::trim))
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of permissions attached to the sub-menu.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "permissions", "sub_menu_id", id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
