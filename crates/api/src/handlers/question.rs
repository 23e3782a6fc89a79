//! Handlers for the `/questions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::error::CoreError;
use pstats_core::questions::validate_question_type;
use pstats_core::types::DbId;
use pstats_db::models::common::{ActiveCounts, SetActive};
use pstats_db::models::content::{
    ContentListParams, CreateQuestion, Question, QuestionFilter, UpdateQuestion,
};
use pstats_db::repositories::{QuestionRepo, SubTopicRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::list_query;
use crate::response::{paginated, success, ApiJson, Page};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Question",
        id,
    })
}

fn validate_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Question text cannot be empty".into()));
    }
    Ok(())
}

/// A sub-topic attached to a question must sit under the question's topic.
async fn ensure_sub_topic_in_topic(
    state: &AppState,
    sub_topic_id: DbId,
    topic_id: DbId,
) -> AppResult<()> {
    let sub_topic = SubTopicRepo::find_by_id(&state.pool, sub_topic_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sub-topic",
            id: sub_topic_id,
        }))?;
    if sub_topic.topic_id != topic_id {
        return Err(CoreError::Validation(format!(
            "Sub-topic {sub_topic_id} does not belong to topic {topic_id}"
        ))
        .into());
    }
    Ok(())
}

/// GET /api/questions
///
/// Filters: `module_id`, `topic_id`, `sub_topic_id`, `active`, `search`.
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ContentListParams>,
) -> AppResult<ApiJson<Page<Question>>> {
    let query = list_query(
        params.search.as_deref(),
        params.active,
        None,
        params.limit,
        params.offset,
    )?;
    let filter = QuestionFilter {
        module_id: params.module_id,
        topic_id: params.topic_id,
        sub_topic_id: params.sub_topic_id,
    };
    let items = QuestionRepo::list(&state.pool, &query, &filter).await?;
    let total = QuestionRepo::count(&state.pool, &query, &filter).await?;
    Ok(paginated(
        "Questions retrieved successfully",
        items,
        total,
        query.limit,
        query.offset,
    ))
}

/// POST /api/questions
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateQuestion>,
) -> AppResult<(StatusCode, ApiJson<Question>)> {
    validate_text(&input.question_text)?;
    if let Some(question_type) = input.question_type.as_deref() {
        validate_question_type(question_type).map_err(CoreError::Validation)?;
    }
    if let Some(sub_topic_id) = input.sub_topic_id {
        ensure_sub_topic_in_topic(&state, sub_topic_id, input.topic_id).await?;
    }

    let created = QuestionRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, question_id = created.id, "Question created");
    Ok((StatusCode::CREATED, success("Question created successfully", created)))
}

/// GET /api/questions/statistics
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<ActiveCounts>> {
    let counts = QuestionRepo::statistics(&state.pool).await?;
    Ok(success("Question statistics retrieved successfully", counts))
}

/// GET /api/questions/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<Question>> {
    let found = QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(success("Question retrieved successfully", found))
}

/// PUT /api/questions/{id}
///
/// The question type is frozen once statistics answer the question.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateQuestion>,
) -> AppResult<ApiJson<Question>> {
    if let Some(text) = input.question_text.as_deref() {
        validate_text(text)?;
    }
    let existing = QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(question_type) = input.question_type.as_deref() {
        validate_question_type(question_type).map_err(CoreError::Validation)?;
        if question_type != existing.question_type {
            let answers = QuestionRepo::child_count(&state.pool, id).await?;
            if answers > 0 {
                return Err(CoreError::Conflict(format!(
                    "Question {id} already has {answers} statistic(s); its type cannot change"
                ))
                .into());
            }
        }
    }
    if let Some(sub_topic_id) = input.sub_topic_id {
        ensure_sub_topic_in_topic(&state, sub_topic_id, existing.topic_id).await?;
    }

    let updated = QuestionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = admin.user_id, question_id = id, "Question updated");
    Ok(success("Question updated successfully", updated))
}

/// PATCH /api/questions/{id}/status
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetActive>,
) -> AppResult<ApiJson<Question>> {
    if !QuestionRepo::set_active(&state.pool, id, input.active).await? {
        return Err(not_found(id));
    }
    let updated = QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = admin.user_id,
        question_id = id,
        active = input.active,
        "Question status changed"
    );
    Ok(success("Question status updated successfully", updated))
}

/// DELETE /api/questions/{id}
///
/// Refused with 409 while statistics answer the question.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let children = QuestionRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(CoreError::has_children("Question", id, "statistic", children).into());
    }
    if !QuestionRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = admin.user_id, question_id = id, "Question deleted");
    Ok(success("Question deleted successfully", ()))
}
