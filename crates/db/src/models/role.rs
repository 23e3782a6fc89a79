//! Roles and permissions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::types::{DbId, Timestamp};

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRole {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for `PUT /roles/{id}/permissions`. Replaces the full set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetRolePermissions {
    #[validate(length(max = 500))]
    pub permission_ids: Vec<DbId>,
}

/// A permission row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub menu_id: Option<DbId>,
    pub sub_menu_id: Option<DbId>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePermission {
    /// Upper-case identifier such as `REPORTS_VIEW`.
    #[validate(length(min = 2, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub menu_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub sub_menu_id: Option<DbId>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePermission {
    #[validate(length(min = 2, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub menu_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub sub_menu_id: Option<DbId>,
}

/// Query parameters for role and permission listings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AccessListParams {
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 1))]
    pub menu_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
