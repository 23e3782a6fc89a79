//! Handlers for the `/permissions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::role::{CreatePermission, AccessListParams, Permission, UpdatePermission};
use pstats_db::repositories::PermissionRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Permission", id })
}

/// GET /api/permissions
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<AccessListParams>,
) -> AppResult<ApiJson<Page<Permission>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.menu_id,
        params.limit,
        params.offset,
    )?;
    let items = PermissionRepo::list(&state.pool, &query).await?;
    let total = PermissionRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Permissions retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/permissions
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePermission>,
) -> AppResult<(StatusCode, ApiJson<Permission>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = PermissionRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, permission_id = created.id, "Permission created");
    Ok((StatusCode::CREATED, success("Permission created successfully", created)))
}

/// GET /api/permissions/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = PermissionRepo::statistics(&state.pool).await?;
    Ok(success("Permission statistics retrieved successfully", counts))
}

/// GET /api/permissions/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Permission>> {
    let found = PermissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Permission retrieved successfully", found))
}

/// PUT /api/permissions/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePermission>,
) -> AppResult<ApiJson<Permission>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;

    let updated = PermissionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, permission_id = id, "Permission updated");
    Ok(success("Permission updated successfully", updated))
}

/// PATCH /api/permissions/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Permission>> {
    if !PermissionRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = PermissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        permission_id = id,
        active = input.active,
        "Permission status changed"
    );
    Ok(success("Permission status updated successfully", updated))
}

/// DELETE /api/permissions/{id}
///
/// Refused with 409 while role assignments still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = PermissionRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Permission", id, "role assignment", children).into());
    }
    if !PermissionRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, permission_id = id, "Permission deleted");
    Ok(success("Permission deleted successfully", ()))
}
