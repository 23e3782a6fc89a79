//! Handlers for the `/menus` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::menu::{CreateMenu, MenuListParams, Menu, UpdateMenu};
use pstats_db::repositories::MenuRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Menu", id })
}

/// GET /api/menus
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<MenuListParams>,
) -> AppResult<ApiJson<Page<Menu>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        None,
        params.limit,
        params.offset,
    )?;
    let items = MenuRepo::list(&state.pool, &query).await?;
    let total = MenuRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Menus retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/menus
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateMenu>,
) -> AppResult<(StatusCode, ApiJson<Menu>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = MenuRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, menu_id = created.id, "Menu created");
    Ok((StatusCode::CREATED, success("Menu created successfully", created)))
}

/// GET /api/menus/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = MenuRepo::statistics(&state.pool).await?;
    Ok(success("Menu statistics retrieved successfully", counts))
}

/// GET /api/menus/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Menu>> {
    let found = MenuRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Menu retrieved successfully", found))
}

/// PUT /api/menus/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateMenu>,
) -> AppResult<ApiJson<Menu>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;

    let updated = MenuRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, menu_id = id, "Menu updated");
    Ok(success("Menu updated successfully", updated))
}

/// PATCH /api/menus/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Menu>> {
    if !MenuRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = MenuRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        menu_id = id,
        active = input.active,
        "Menu status changed"
    );
    Ok(success("Menu status updated successfully", updated))
}

/// DELETE /api/menus/{id}
///
/// Refused with 409 while sub-menus or permissions still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = MenuRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Menu", id, "sub-menu or permission", children).into());
    }
    if !MenuRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, menu_id = id, "Menu deleted");
    Ok(success("Menu deleted successfully", ()))
}
