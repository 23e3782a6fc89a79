//! Handlers for the `/topics` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::types::DbId;
use pstats_core::validation::{validate_name, validate_optional};
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::content::{CreateTopic, ContentListParams, Topic, UpdateTopic};
use pstats_db::repositories::TopicRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Topic", id })
}

/// GET /api/topics
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ContentListParams>,
) -> AppResult<ApiJson<Page<Topic>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        params.module_id,
        params.limit,
        params.offset,
    )?;
    let items = TopicRepo::list(&state.pool, &query).await?;
    let total = TopicRepo::count(&state.pool, &query).await?;
    Ok(paginated(
        "Topics retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/topics
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTopic>,
) -> AppResult<(StatusCode, ApiJson<Topic>)> {
    validate_name(&input.name).map_err(CoreError::Validation)?;

    let created = TopicRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, topic_id = created.id, "Topic created");
    Ok((StatusCode::CREATED, success("Topic created successfully", created)))
}

/// GET /api/topics/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = TopicRepo::statistics(&state.pool).await?;
    Ok(success("Topic statistics retrieved successfully", counts))
}

/// GET /api/topics/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Topic>> {
    let found = TopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Topic retrieved successfully", found))
}

/// PUT /api/topics/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTopic>,
) -> AppResult<ApiJson<Topic>> {
    validate_optional(input.name.as_deref(), None).map_err(CoreError::Validation)?;

    let updated = TopicRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, topic_id = id, "Topic updated");
    Ok(success("Topic updated successfully", updated))
}

/// PATCH /api/topics/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Topic>> {
    if !TopicRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = TopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        topic_id = id,
        active = input.active,
        "Topic status changed"
    );
    Ok(success("Topic status updated successfully", updated))
}

/// DELETE /api/topics/{id}
///
/// Refused with 409 while sub-topics or questions still reference it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = TopicRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Topic", id, "sub-topic or question", children).into());
    }
    if !TopicRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, topic_id = id, "Topic deleted");
    Ok(success("Topic deleted successfully", ()))
}
