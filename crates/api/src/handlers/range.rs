//! Handlers for the `/ranges` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_code, validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::geography::{CreateRange, GeoListParams, Range, UpdateRange};
use pstats_db::repositories::RangeRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Range", id })
}

/// GET /api/ranges
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<GeoListParams>,
) -> AppResult<ApiJson<Page<Range>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.district_id,
        params.limit,
        params.offset,
    )?;
    let items = RangeRepo::list(&state.pool, &query).await?;
    let total = RangeRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Ranges retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/ranges
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateRange>,
) -> AppResult<(StatusCode, ApiJson<Range>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;
    validate_code(&input.code).map_err(CoreError::Validation)?;

    let created = RangeRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, range_id = created.id, "Range created");
    Ok((StatusCode::CREATED, success("Range created successfully", created)))
}

/// GET /api/ranges/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = RangeRepo::statistics(&state.pool).await?;
    Ok(success("Range statistics retrieved successfully", counts))
}

/// GET /api/ranges/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Range>> {
    let found = RangeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Range retrieved successfully", found))
}

/// PUT /api/ranges/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateRange>,
) -> AppResult<ApiJson<Range>> {
    validate_optional(input.name.as_deref(), input.code.as_deref())
        .map_err(CoreError::Validation)?;

    let updated = RangeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, range_id = id, "Range updated");
    Ok(success("Range updated successfully", updated))
}

/// PATCH /api/ranges/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Range>> {
    if !RangeRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = RangeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        range_id = id,
        active = input.active,
        "Range status changed"
    );
    Ok(success("Range status updated successfully", updated))
}

/// DELETE /api/ranges/{id}
///
/// Refused with 409 while battalions still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = RangeRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Range", id, "battalion", children).into());
    }
    if !RangeRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, range_id = id, "Range deleted");
    Ok(success("Range deleted successfully", ()))
}
