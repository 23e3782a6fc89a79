//! Handlers for the `/sub-menus` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::menu::{CreateSubMenu, MenuListParams, SubMenu, UpdateSubMenu};
use pstats_db::repositories::SubMenuRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Sub-menu", id })
}

/// GET /api/sub-menus
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<MenuListParams>,
) -> AppResult<ApiJson<Page<SubMenu>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.menu_id,
        params.limit,
        params.offset,
    )?;
    let items = SubMenuRepo::list(&state.pool, &query).await?;
    let total = SubMenuRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Sub-menus retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/sub-menus
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateSubMenu>,
) -> AppResult<(StatusCode, ApiJson<SubMenu>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = SubMenuRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, sub_menu_id = created.id, "Sub-menu created");
    Ok((StatusCode::CREATED, success("Sub-menu created successfully", created)))
}

/// GET /api/sub-menus/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = SubMenuRepo::statistics(&state.pool).await?;
    Ok(success("Sub-menu statistics retrieved successfully", counts))
}

/// GET /api/sub-menus/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<SubMenu>> {
    let found = SubMenuRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Sub-menu retrieved successfully", found))
}

/// PUT /api/sub-menus/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateSubMenu>,
) -> AppResult<ApiJson<SubMenu>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;

    let updated = SubMenuRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, sub_menu_id = id, "Sub-menu updated");
    Ok(success("Sub-menu updated successfully", updated))
}

/// PATCH /api/sub-menus/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<SubMenu>> {
    if !SubMenuRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = SubMenuRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        sub_menu_id = id,
        active = input.active,
        "Sub-menu status changed"
    );
    Ok(success("Sub-menu status updated successfully", updated))
}

/// DELETE /api/sub-menus/{id}
///
/// Refused with 409 while permissions still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = SubMenuRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Sub-menu", id, "permission", children).into());
    }
    if !SubMenuRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, sub_menu_id = id, "Sub-menu deleted");
    Ok(success("Sub-menu deleted successfully", ()))
}
