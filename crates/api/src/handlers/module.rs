//! Handlers for the `/modules` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::content::{CreateModule, ContentListParams, Module, UpdateModule};
use pstats_db::repositories::ModuleRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Module", id })
}

/// GET /api/modules
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ContentListParams>,
) -> AppResult<ApiJson<Page<Module>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        None,
        params.limit,
        params.offset,
    )?;
    let items = ModuleRepo::list(&state.pool, &query).await?;
    let total = ModuleRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Modules retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/modules
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateModule>,
) -> AppResult<(StatusCode, ApiJson<Module>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = ModuleRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, module_id = created.id, "Module created");
    Ok((StatusCode::CREATED, success("Module created successfully", created)))
}

/// GET /api/modules/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = ModuleRepo::statistics(&state.pool).await?;
    Ok(success("Module statistics retrieved successfully", counts))
}

/// GET /api/modules/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Module>> {
    let found = ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Module retrieved successfully", found))
}

/// PUT /api/modules/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateModule>,
) -> AppResult<ApiJson<Module>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;

    let updated = ModuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, module_id = id, "Module updated");
    Ok(success("Module updated successfully", updated))
}

/// PATCH /api/modules/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Module>> {
    if !ModuleRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        module_id = id,
        active = input.active,
        "Module status changed"
    );
    Ok(success("Module status updated successfully", updated))
}

/// DELETE /api/modules/{id}
///
/// Refused with 409 while topics still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = ModuleRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Module", id, "topic", children).into());
    }
    if !ModuleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, module_id = id, "Module deleted");
    Ok(success("Module deleted successfully", ()))
}
