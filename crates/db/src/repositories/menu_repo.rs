//! Repository for the `menus` table.

use sqlx::PgPool;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::menu::{CreateMenu, Menu, UpdateMenu};

const TABLE: &str = "menus";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, path, icon, sort_order, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BOOL IS NULL OR active = $1) \
                        AND ($2::TEXT IS NULL OR name ILIKE $2 OR path ILIKE $2)";

/// Provides CRUD operations for menus.
pub struct MenuRepo;

impl MenuRepo {
    /// Insert a new menu, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMenu) -> Result<Menu, sqlx::Error> {
        let query = format!(
            "INSERT INTO menus (name, path, icon, sort_order, active)
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(input.name.trim())
            .bind(input.path.trim())
            .bind(&input.icon)
            .bind(input.sort_order)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Menu>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM menus WHERE id = $1");
        sqlx::query_as::<_, Menu>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List menus in display order.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<Menu>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM menus {FILTER} \
             ORDER BY sort_order ASC, name ASC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM menus {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Active menus the user reaches through at least one permission of an
    /// active role.
    ///
    /// A permission grants its menu directly, or the parent menu of its sub-menu.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Menu>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM menus
             WHERE active = TRUE
               AND id IN (
                   SELECT COALESCE(p.menu_id, sm.menu_id)
                   FROM user_roles ur
                   JOIN roles r ON r.id = ur.role_id AND r.active = TRUE
                   JOIN role_permissions rp ON rp.role_id = r.id
                   JOIN permissions p ON p.id = rp.permission_id AND p.active = TRUE
                   LEFT JOIN sub_menus sm ON sm.id = p.sub_menu_id
                   WHERE ur.user_id = $1
               )
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a menu. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMenu,
    ) -> Result<Option<Menu>, sqlx::Error> {
        let query = format!(
            "UPDATE menus SET
                name = COALESCE($2, name),
                path = COALESCE($3, path),
                icon = COALESCE($4, icon),
                sort_order = COALESCE($5, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.path.as_deref().map(str::trim))
            .bind(&input.icon)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of sub-menus and permissions attached to the menu.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let sub_menus = common::count_referencing(pool, "sub_menus", "menu_id", id).await?;
        let permissions = common::count_referencing(pool, "permissions", "menu_id", id).await?;
        Ok(sub_menus + permissions)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
