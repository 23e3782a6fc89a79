//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::scope::DataScope;
use pstats_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub state_id: Option<DbId>,
    pub district_id: Option<DbId>,
    pub range_id: Option<DbId>,
    pub battalion_id: Option<DbId>,
    pub active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The geographic subtree this user is attached to.
    pub fn scope(&self) -> DataScope {
        DataScope {
            state_id: self.state_id,
            district_id: self.district_id,
            range_id: self.range_id,
            battalion_id: self.battalion_id,
        }
    }

    pub fn into_response(self, roles: Vec<String>) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            state_id: self.state_id,
            district_id: self.district_id,
            range_id: self.range_id,
            battalion_id: self.battalion_id,
            active: self.active,
            roles,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub state_id: Option<DbId>,
    pub district_id: Option<DbId>,
    pub range_id: Option<DbId>,
    pub battalion_id: Option<DbId>,
    pub active: bool,
    /// Resolved role names (e.g. `["admin"]`).
    pub roles: Vec<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub scope: DataScope,
    pub active: Option<bool>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub full_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

/// Resolved filter for user listings.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub geo: DataScope,
    pub role_id: Option<DbId>,
}

/// Query parameters for `GET /users`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserListParams {
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 1))]
    pub role_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub state_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub district_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub range_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub battalion_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Role name attached to one user, used to resolve roles for a page of users.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleName {
    pub user_id: DbId,
    pub name: String,
}
