//! Handlers for the `/battalions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_code, validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::geography::{CreateBattalion, GeoListParams, Battalion, UpdateBattalion};
use pstats_db::repositories::BattalionRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Battalion", id })
}

/// GET /api/battalions
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<GeoListParams>,
) -> AppResult<ApiJson<Page<Battalion>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.range_id,
        params.limit,
        params.offset,
    )?;
    let items = BattalionRepo::list(&state.pool, &query).await?;
    let total = BattalionRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Battalions retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/battalions
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateBattalion>,
) -> AppResult<(StatusCode, ApiJson<Battalion>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;
    validate_code(&input.code).map_err(CoreError::Validation)?;

    let created = BattalionRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, battalion_id = created.id, "Battalion created");
    Ok((StatusCode::CREATED, success("Battalion created successfully", created)))
}

/// GET /api/battalions/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = BattalionRepo::statistics(&state.pool).await?;
    Ok(success("Battalion statistics retrieved successfully", counts))
}

/// GET /api/battalions/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Battalion>> {
    let found = BattalionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Battalion retrieved successfully", found))
}

/// PUT /api/battalions/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateBattalion>,
) -> AppResult<ApiJson<Battalion>> {
    validate_optional(input.name.as_deref(), input.code.as_deref())
        .map_err(CoreError::Validation)?;

    let updated = BattalionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, battalion_id = id, "Battalion updated");
    Ok(success("Battalion updated successfully", updated))
}

/// PATCH /api/battalions/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Battalion>> {
    if !BattalionRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = BattalionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        battalion_id = id,
        active = input.active,
        "Battalion status changed"
    );
    Ok(success("Battalion status updated successfully", updated))
}

/// DELETE /api/battalions/{id}
///
/// Refused with 409 while statistics or users still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = BattalionRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Battalion", id, "statistic or user", children).into());
    }
    if !BattalionRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, battalion_id = id, "Battalion deleted");
    Ok(success("Battalion deleted successfully", ()))
}
