//! Navigation menus and sub-menus.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::types::{DbId, Timestamp};

/// A row from the `menus` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Menu {
    pub id: DbId,
    pub name: String,
    pub path: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMenu {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub path: String,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMenu {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub path: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
}

/// A row from the `sub_menus` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubMenu {
    pub id: DbId,
    pub menu_id: DbId,
    pub name: String,
    pub path: String,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubMenu {
    #[validate(range(min = 1))]
    pub menu_id: DbId,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub path: String,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubMenu {
    #[validate(range(min = 1))]
    pub menu_id: Option<DbId>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub path: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
}

/// A menu with the sub-menus a user can reach, as returned by `GET /auth/me/menus`.
#[derive(Debug, Clone, Serialize)]
pub struct MenuTree {
    #[serde(flatten)]
    pub menu: Menu,
    pub sub_menus: Vec<SubMenu>,
}

/// Query parameters for menu and sub-menu listings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MenuListParams {
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 1))]
    pub menu_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
