//! Handlers for the `/districts` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_code, validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::geography::{CreateDistrict, GeoListParams, District, UpdateDistrict};
use pstats_db::repositories::DistrictRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "District", id })
}

/// GET /api/districts
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<GeoListParams>,
) -> AppResult<ApiJson<Page<District>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.state_id,
        params.limit,
        params.offset,
    )?;
    let items = DistrictRepo::list(&state.pool, &query).await?;
    let total = DistrictRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Districts retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/districts
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateDistrict>,
) -> AppResult<(StatusCode, ApiJson<District>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;
    validate_code(&input.code).map_err(CoreError::Validation)?;

    let created = DistrictRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, district_id = created.id, "District created");
    Ok((StatusCode::CREATED, success("District created successfully", created)))
}

/// GET /api/districts/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = DistrictRepo::statistics(&state.pool).await?;
    Ok(success("District statistics retrieved successfully", counts))
}

/// GET /api/districts/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<District>> {
    let found = DistrictRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("District retrieved successfully", found))
}

/// PUT /api/districts/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateDistrict>,
) -> AppResult<ApiJson<District>> {
    validate_optional(input.name.as_deref(), input.code.as_deref())
        .map_err(CoreError::Validation)?;

    let updated = DistrictRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, district_id = id, "District updated");
    Ok(success("District updated successfully", updated))
}

/// PATCH /api/districts/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<District>> {
    if !DistrictRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = DistrictRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        district_id = id,
        active = input.active,
        "District status changed"
    );
    Ok(success("District status updated successfully", updated))
}

/// DELETE /api/districts/{id}
///
/// Refused with 409 while ranges still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = DistrictRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("District", id, "range", children).into());
    }
    if !DistrictRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, district_id = id, "District deleted");
    Ok(success("District deleted successfully", ()))
}
