//! Handlers for the `/states` resource.

use axum::extract::{Path, State as AxumState};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_code, validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::geography::{CreateState, GeoListParams, State, UpdateState};
use pstats_db::repositories::StateRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "State", id })
}

/// GET /api/states
pub async fn list(
    RequireAuth(_user): RequireAuth,
    AxumState(state): AxumState<AppState>,
    ValidatedQuery(params): ValidatedQuery<GeoListParams>,
) -> AppResult<ApiJson<Page<State>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        None,
        params.limit,
        params.offset,
    )?;
    let items = StateRepo::list(&state.pool, &query).await?;
    let total = StateRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "States retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/states
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    AxumState(state): AxumState<AppState>,
    ValidatedJson(input): ValidatedJson<CreateState>,
) -> AppResult<(StatusCode, ApiJson<State>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;
    validate_code(&input.code).map_err(CoreError::Validation)?;

    let created = StateRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, state_id = created.id, "State created");
    Ok((StatusCode::CREATED, success("State created successfully", created)))
}

/// GET /api/states/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    AxumState(state): AxumState<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = StateRepo::statistics(&state.pool).await?;
    Ok(success("State statistics retrieved successfully", counts))
}

/// GET /api/states/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    AxumState(state): AxumState<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<State>> {
    let found = StateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("State retrieved successfully", found))
}

/// PUT /api/states/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    AxumState(state): AxumState<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateState>,
) -> AppResult<ApiJson<State>> {
    validate_optional(input.name.as_deref(), input.code.as_deref())
        .map_err(CoreError::Validation)?;

    let updated = StateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, state_id = id, "State updated");
    Ok(success("State updated successfully", updated))
}

/// PATCH /api/states/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    AxumState(state): AxumState<AppState>,
    Path(id): Path<DbId>,
    axum::Json(input): axum::Json<SetActive>,
) -> AppResult<ApiJson<State>> {
    if !StateRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = StateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, state_id = id, active = input.active, "State status changed");
    Ok(success("State status updated successfully", updated))
}

/// DELETE /api/states/{id}
///
/// Refused with 409 while districts still reference the state.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    AxumState(state): AxumState<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = StateRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("State", id, "district", children).into());
    }
    if !StateRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, state_id = id, "State deleted");
    Ok(success("State deleted successfully", ()))
}
