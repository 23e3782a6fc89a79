//! Admin handlers for the `/users` resource.
//!
//! Every endpoint here requires the `admin` role. Users manage their own
//! profile and password through `/auth/me`.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::roles;
use pstats_core::scope::DataScope;
use pstats_core::types::DbId;
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::user::{
    CreateUser, UpdateUser, User, UserFilter, UserListParams, UserResponse,
};
use pstats_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::scope::resolve_scope;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    /// Geography node the user is attached to. Only admins may omit it.
    #[serde(default)]
    pub scope: DataScope,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub role_ids: Vec<DbId>,
    pub active: Option<bool>,
}

/// Request body for `PUT /users/{id}`.
///
/// `scope`, when present, replaces the user's whole scope; `{}` clears it,
/// which is only allowed for admins.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: UpdateUser,
    pub scope: Option<DataScope>,
}

/// Request body for `PUT /users/{id}/roles`.
#[derive(Debug, Deserialize, Validate)]
pub struct SetUserRolesRequest {
    #[validate(length(max = 20))]
    pub role_ids: Vec<DbId>,
}

/// Request body for `POST /users/{id}/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(max = 128))]
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

fn validate_username(username: &str) -> Result<(), CoreError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Username may only contain letters, digits, '.', '_' or '-'".into(),
        ))
    }
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn to_response(state: &AppState, user: User) -> AppResult<UserResponse> {
    let roles = UserRepo::role_names(&state.pool, user.id).await?;
    Ok(user.into_response(roles))
}

/// Reject unknown or non-positive role ids before writing `user_roles`.
///
/// Returns the names of the roles.
async fn validate_role_ids(state: &AppState, role_ids: &[DbId]) -> AppResult<Vec<String>> {
    let mut names = Vec::with_capacity(role_ids.len());
    for &role_id in role_ids {
        if role_id <= 0 {
            return Err(CoreError::Validation("role_ids must be positive integers".into()).into());
        }
        let role = RoleRepo::find_by_id(&state.pool, role_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Role",
                id: role_id,
            }))?;
        names.push(role.name);
    }
    Ok(names)
}

/// Only admins may exist without a geography node.
fn ensure_scoped<S: AsRef<str>>(role_names: &[S], scope: &DataScope) -> Result<(), CoreError> {
    if scope.is_unrestricted() && !roles::is_admin(role_names) {
        return Err(CoreError::Validation(
            "Users without the admin role must be attached to a geographic scope".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/users
///
/// Filters: `search`, `active`, `role_id`, `state_id`, `district_id`,
/// `range_id`, `battalion_id`.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<UserListParams>,
) -> AppResult<ApiJson<Page<UserResponse>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        None,
        params.limit,
        params.offset,
    )?;
    let filter = UserFilter {
        geo: DataScope {
            state_id: params.state_id,
            district_id: params.district_id,
            range_id: params.range_id,
            battalion_id: params.battalion_id,
        },
        role_id: params.role_id,
    };

    let users = UserRepo::list(&state.pool, &query, &filter).await?;
    let total = UserRepo::count(&state.pool, &query, &filter).await?;

    let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let mut roles_by_user: HashMap<DbId, Vec<String>> = HashMap::new();
    for row in UserRepo::role_names_for_users(&state.pool, &ids).await? {
        roles_by_user.entry(row.user_id).or_default().push(row.name);
    }

    let items = users
        .into_iter()
        .map(|u| {
            let roles = roles_by_user.remove(&u.id).unwrap_or_default();
            u.into_response(roles)
        })
        .collect();

    Ok(paginated(
        "Users retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/users
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, ApiJson<UserResponse>)> {
    validate_username(&input.username)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;
    let role_names = validate_role_ids(&state, &input.role_ids).await?;
    let scope = resolve_scope(&state, input.scope).await?;
    ensure_scoped(&role_names, &scope)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            full_name: input.full_name,
            phone: input.phone,
            scope,
            active: input.active,
        },
        &input.role_ids,
    )
    .await?;

    tracing::info!(user_id = admin.user_id, created_user_id = user.id, "User created");
    let response = to_response(&state, user).await?;
    Ok((StatusCode::CREATED, success("User created successfully", response)))
}

/// GET /api/users/statistics
pub async fn statistics(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = UserRepo::statistics(&state.pool).await?;
    Ok(success("User statistics retrieved successfully", counts))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<UserResponse>> {
    let user = find_user(&state, id).await?;
    let response = to_response(&state, user).await?;
    Ok(success("User retrieved successfully", response))
}

/// PUT /api/users/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> AppResult<ApiJson<UserResponse>> {
    if let Some(username) = input.profile.username.as_deref() {
        validate_username(username)?;
    }
    find_user(&state, id).await?;

    let scope = match input.scope {
        Some(requested) => {
            let scope = resolve_scope(&state, requested).await?;
            let role_names = UserRepo::role_names(&state.pool, id).await?;
            ensure_scoped(&role_names, &scope)?;
            Some(scope)
        }
        None => None,
    };
    let user = UserRepo::update(&state.pool, id, &input.profile, scope.as_ref())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(user_id = admin.user_id, updated_user_id = id, "User updated");
    let response = to_response(&state, user).await?;
    Ok(success("User updated successfully", response))
}

/// PATCH /api/users/{id}/status
///
/// Deactivation also revokes every session of the user.
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<UserResponse>> {
    if id == admin.user_id && !input.active {
        return Err(CoreError::Validation("You cannot deactivate your own account".into()).into());
    }
    if !UserRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    if !input.active {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    tracing::info!(
        user_id = admin.user_id,
        updated_user_id = id,
        active = input.active,
        "User status changed"
    );
    let user = find_user(&state, id).await?;
    let response = to_response(&state, user).await?;
    Ok(success("User status updated successfully", response))
}

/// DELETE /api/users/{id}
///
/// Refused with 409 while the user has sent communications or submitted
/// statistics; deactivate such users instead.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    if id == admin.user_id {
        return Err(CoreError::Validation("You cannot delete your own account".into()).into());
    }
    let children = UserRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(
            CoreError::has_children("User", id, "communication or statistic", children).into(),
        );
    }
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, deleted_user_id = id, "User deleted");
    Ok(success("User deleted successfully", ()))
}

/// PUT /api/users/{id}/roles
///
/// Replaces the full role set. Takes effect at the user's next login or
/// token refresh.
pub async fn set_roles(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetUserRolesRequest>,
) -> AppResult<ApiJson<UserResponse>> {
    let user = find_user(&state, id).await?;
    let role_names = validate_role_ids(&state, &input.role_ids).await?;
    ensure_scoped(&role_names, &user.scope())?;

    UserRepo::set_roles(&state.pool, id, &input.role_ids).await?;
    tracing::info!(
        user_id = admin.user_id,
        updated_user_id = id,
        role_count = input.role_ids.len(),
        "User roles replaced"
    );
    let response = to_response(&state, user).await?;
    Ok(success("User roles updated successfully", response))
}

/// POST /api/users/{id}/reset-password
///
/// Sets a new password, clears any lockout and revokes existing sessions.
pub async fn reset_password(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<ApiJson<()>> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;
    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &password_hash).await? {
        return Err(not_found(id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = admin.user_id, target_user_id = id, "Password reset by admin");
    Ok(success("Password reset successfully", ()))
}
