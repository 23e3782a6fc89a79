//! Handlers for the `/sub-topics` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::content::{CreateSubTopic, ContentListParams, SubTopic, UpdateSubTopic};
use pstats_db::repositories::SubTopicRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Sub-topic", id })
}

/// GET /api/sub-topics
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ContentListParams>,
) -> AppResult<ApiJson<Page<SubTopic>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.topic_id,
        params.limit,
        params.offset,
    )?;
    let items = SubTopicRepo::list(&state.pool, &query).await?;
    let total = SubTopicRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Sub-topics retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/sub-topics
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateSubTopic>,
) -> AppResult<(StatusCode, ApiJson<SubTopic>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = SubTopicRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, sub_topic_id = created.id, "Sub-topic created");
    Ok((StatusCode::CREATED, success("Sub-topic created successfully", created)))
}

/// GET /api/sub-topics/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = SubTopicRepo::statistics(&state.pool).await?;
    Ok(success("Sub-topic statistics retrieved successfully", counts))
}

/// GET /api/sub-topics/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<SubTopic>> {
    let found = SubTopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Sub-topic retrieved successfully", found))
}

/// PUT /api/sub-topics/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateSubTopic>,
) -> AppResult<ApiJson<SubTopic>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;

    let updated = SubTopicRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, sub_topic_id = id, "Sub-topic updated");
    Ok(success("Sub-topic updated successfully", updated))
}

/// PATCH /api/sub-topics/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<SubTopic>> {
    if !SubTopicRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = SubTopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        sub_topic_id = id,
        active = input.active,
        "Sub-topic status changed"
    );
    Ok(success("Sub-topic status updated successfully", updated))
}

/// DELETE /api/sub-topics/{id}
///
/// Refused with 409 while questions still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = SubTopicRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Sub-topic", id, "question", children).into());
    }
    if !SubTopicRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, sub_topic_id = id, "Sub-topic deleted");
    Ok(success("Sub-topic deleted successfully", ()))
}
