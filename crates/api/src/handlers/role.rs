//! Handlers for the `/roles` resource and its permission assignments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::roles::ROLE_ADMIN;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::role::{
    AccessListParams, CreateRole, Permission, Role, SetRolePermissions, UpdateRole,
};
use pstats_db::repositories::RoleRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Role", id })
}

async fn find_role(state: &AppState, id: DbId) -> AppResult<Role> {
    RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// The seeded `admin` role cannot be renamed, deactivated or deleted.
fn ensure_not_admin_role(role: &Role, action: &str) -> AppResult<()> {
    if role.name == ROLE_ADMIN {
        return Err(CoreError::Conflict(format!("The {ROLE_ADMIN} role cannot be {action}")).into());
    }
    Ok(())
}

/// GET /api/roles
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<AccessListParams>,
) -> AppResult<ApiJson<Page<Role>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        None,
        params.limit,
        params.offset,
    )?;
    let items = RoleRepo::list(&state.pool, &query).await?;
    let total = RoleRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Roles retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/roles
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateRole>,
) -> AppResult<(StatusCode, ApiJson<Role>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = RoleRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, role_id = created.id, "Role created");
    Ok((StatusCode::CREATED, success("Role created successfully", created)))
}

/// GET /api/roles/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = RoleRepo::statistics(&state.pool).await?;
    Ok(success("Role statistics retrieved successfully", counts))
}

/// GET /api/roles/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Role>> {
    let role = find_role(&state, id).await?;
    Ok(success("Role retrieved successfully", role))
}

/// PUT /api/roles/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateRole>,
) -> AppResult<ApiJson<Role>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;
    let existing = find_role(&state, id).await?;
    if input.name.as_deref().is_some_and(|name| name != existing.name) {
        ensure_not_admin_role(&existing, "renamed")?;
    }

    let updated = RoleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, role_id = id, "Role updated");
    Ok(success("Role updated successfully", updated))
}

/// PATCH /api/roles/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Role>> {
    let existing = find_role(&state, id).await?;
    if !input.active {
        ensure_not_admin_role(&existing, "deactivated")?;
    }
    RoleRepo::set_active(&state.pool, id, input.active).await?;
    let updated = find_role(&state, id).await?;
    tracing::info!(
        user_id = admin.user_id,
        role_id = id,
        active = input.active,
        "Role status changed"
    );
    Ok(success("Role status updated successfully", updated))
}

/// DELETE /api/roles/{id}
///
/// Refused with 409 while users hold the role.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let existing = find_role(&state, id).await?;
    ensure_not_admin_role(&existing, "deleted")?;

    let children = RoleRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Role", id, "user assignment", children).into());
    }
    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, role_id = id, "Role deleted");
    Ok(success("Role deleted successfully", ()))
}

/// GET /api/roles/{id}/permissions
pub async fn get_permissions(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Vec<Permission>>> {
    find_role(&state, id).await?;
    let permissions = RoleRepo::list_permissions(&state.pool, id).await?;
    Ok(success("Role permissions retrieved successfully", permissions))
}

/// PUT /api/roles/{id}/permissions
///
/// Replaces the full permission set. Unknown permission ids fail with 409 and
/// leave the previous set untouched.
pub async fn set_permissions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetRolePermissions>,
) -> AppResult<ApiJson<Vec<Permission>>> {
    if input.permission_ids.iter().any(|pid| *pid <= 0) {
        return Err(CoreError::Validation(
            "permission_ids must be positive integers".into(),
        )
        .into());
    }
    find_role(&state, id).await?;

    RoleRepo::set_permissions(&state.pool, id, &input.permission_ids).await?;
    let permissions = RoleRepo::list_permissions(&state.pool, id).await?;
    tracing::info!(
        user_id = admin.user_id,
        role_id = id,
        permission_count = permissions.len(),
        "Role permissions replaced"
    );
    Ok(success("Role permissions updated successfully", permissions))
}
