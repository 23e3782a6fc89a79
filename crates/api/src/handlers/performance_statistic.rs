//! Handlers for the `/performance-statistics` resource.
//!
//! Non-admin callers read and write only inside their geographic scope. A
//! submission for an existing (battalion, question, reporting date) overwrites
//! the stored value.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use pstats_core::error::CoreError;
use pstats_core::pagination;
use pstats_core::questions::validate_value;
use pstats_core::report::{parse_date, ReportFilter};
use pstats_core::scope::{enforce_geo_filter, ensure_within_scope, GeoFilter, Location};
use pstats_core::types::{Date, DbId};
use pstats_db::models::content::QuestionContext;
use pstats_db::models::performance_statistic::{
    BulkSubmitStatistics, NewStatistic, PerformanceStatistic, StatisticListParams,
    StatisticSummary, SubmitStatistic, UpdateStatistic,
};
use pstats_db::repositories::{BattalionRepo, PerformanceStatisticRepo, QuestionRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::{paginated, success, ApiJson, Page};
use crate::scope::ensure_filter_in_scope;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Performance statistic", id })
}

/// Response body for `POST /performance-statistics/bulk`.
#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub inserted: usize,
    pub updated: usize,
    pub items: Vec<PerformanceStatistic>,
}

/// Build the repository filter from query parameters, narrowed to the
/// caller's scope.
async fn statistic_filter(
    state: &AppState,
    params: &StatisticListParams,
    user: &AuthUser,
) -> AppResult<ReportFilter> {
    let scope = user.data_scope()?;
    let from_date = parse_date("from_date", params.from_date.as_deref())?;
    let to_date = parse_date("to_date", params.to_date.as_deref())?;
    if let (Some(from), Some(to)) = (from_date, to_date) {
        if from > to {
            return Err(CoreError::Validation(
                "from_date must not be after to_date".into(),
            )
            .into());
        }
    }

    let requested = GeoFilter {
        state_id: params.state_id,
        district_id: params.district_id,
        range_id: params.range_id,
        battalion_id: params.battalion_id,
    };
    let geo = enforce_geo_filter(requested, &scope)?;
    ensure_filter_in_scope(state, &geo, &scope).await?;

    Ok(ReportFilter {
        geo,
        module_id: params.module_id,
        topic_id: params.topic_id,
        sub_topic_id: params.sub_topic_id,
        question_id: params.question_id,
        from_date,
        to_date,
    })
}

fn ensure_not_future(reporting_date: Date) -> Result<(), CoreError> {
    if reporting_date > Utc::now().date_naive() {
        return Err(CoreError::Validation(
            "reporting_date cannot be in the future".into(),
        ));
    }
    Ok(())
}

/// Resolve the battalion's position and check it against the caller's scope.
async fn writable_location(
    state: &AppState,
    user: &AuthUser,
    battalion_id: DbId,
) -> AppResult<Location> {
    let location = BattalionRepo::find_location(&state.pool, battalion_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Battalion", id: battalion_id })?;
    ensure_within_scope(&user.data_scope()?, &location)?;
    Ok(location)
}

/// Load an active question and check `value` against its type.
async fn answerable_question(
    state: &AppState,
    question_id: DbId,
    value: f64,
) -> AppResult<QuestionContext> {
    let question = QuestionRepo::find_context(&state.pool, question_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Question", id: question_id })?;
    if !question.active {
        return Err(CoreError::Validation(format!(
            "Question {question_id} is inactive and cannot be answered"
        ))
        .into());
    }
    validate_value(&question.question_type, value)
        .map_err(|e| CoreError::Validation(format!("Question {question_id}: {e}")))?;
    Ok(question)
}

/// Load a statistic the caller may see. Rows outside the scope read as
/// missing.
async fn find_visible(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<PerformanceStatistic> {
    let found = PerformanceStatisticRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !user.data_scope()?.permits(&found.location()) {
        return Err(not_found(id));
    }
    Ok(found)
}

/// GET /api/performance-statistics
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<StatisticListParams>,
) -> AppResult<ApiJson<Page<PerformanceStatistic>>> {
    let filter = statistic_filter(&state, &params, &user).await?;
    let (limit, offset) = pagination::page(params.limit, params.offset);
    let items = PerformanceStatisticRepo::list(&state.pool, &filter, limit, offset).await?;
    let total = PerformanceStatisticRepo::count(&state.pool, &filter).await?;
    Ok(paginated(
        "Performance statistics retrieved successfully",
        items,
        total,
        limit,
        offset,
    ))
}

/// POST /api/performance-statistics
///
/// 201 when a new row was recorded, 200 when an existing one was overwritten.
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SubmitStatistic>,
) -> AppResult<(StatusCode, ApiJson<PerformanceStatistic>)> {
    ensure_not_future(input.reporting_date)?;
    let location = writable_location(&state, &user, input.battalion_id).await?;
    let question = answerable_question(&state, input.question_id, input.value).await?;

    let new = NewStatistic {
        location,
        question,
        reporting_date: input.reporting_date,
        value: input.value,
        remarks: input.remarks,
        submitted_by: user.user_id,
    };
    let upserted = PerformanceStatisticRepo::upsert(&state.pool, &new).await?;
    let statistic = upserted.statistic;
    tracing::info!(
        user_id = user.user_id,
        statistic_id = statistic.id,
        battalion_id = statistic.battalion_id,
        question_id = statistic.question_id,
        inserted = upserted.inserted,
        "Performance statistic submitted"
    );

    if upserted.inserted {
        Ok((
            StatusCode::CREATED,
            success("Performance statistic recorded successfully", statistic),
        ))
    } else {
        Ok((
            StatusCode::OK,
            success("Performance statistic updated successfully", statistic),
        ))
    }
}

/// POST /api/performance-statistics/bulk
///
/// All entries share one battalion and reporting date. Every entry is checked
/// before anything is written; the batch is stored in one transaction.
pub async fn bulk_submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<BulkSubmitStatistics>,
) -> AppResult<ApiJson<BulkResult>> {
    ensure_not_future(input.reporting_date)?;
    let location = writable_location(&state, &user, input.battalion_id).await?;

    let mut seen = HashSet::with_capacity(input.entries.len());
    let mut batch = Vec::with_capacity(input.entries.len());
    for entry in input.entries {
        if !seen.insert(entry.question_id) {
            return Err(CoreError::Validation(format!(
                "Question {} appears more than once in the batch",
                entry.question_id
            ))
            .into());
        }
        let question = answerable_question(&state, entry.question_id, entry.value).await?;
        batch.push(NewStatistic {
            location,
            question,
            reporting_date: input.reporting_date,
            value: entry.value,
            remarks: entry.remarks,
            submitted_by: user.user_id,
        });
    }

    let results = PerformanceStatisticRepo::bulk_upsert(&state.pool, &batch).await?;
    let inserted = results.iter().filter(|r| r.inserted).count();
    let updated = results.len() - inserted;
    tracing::info!(
        user_id = user.user_id,
        battalion_id = input.battalion_id,
        inserted,
        updated,
        "Performance statistics submitted in bulk"
    );
    Ok(success(
        "Performance statistics submitted successfully",
        BulkResult {
            inserted,
            updated,
            items: results.into_iter().map(|r| r.statistic).collect(),
        },
    ))
}

/// GET /api/performance-statistics/statistics
pub async fn statistics(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<StatisticListParams>,
) -> AppResult<ApiJson<StatisticSummary>> {
    let filter = statistic_filter(&state, &params, &user).await?;
    let summary = PerformanceStatisticRepo::statistics(&state.pool, &filter).await?;
    Ok(success(
        "Performance statistic summary retrieved successfully",
        summary,
    ))
}

/// GET /api/performance-statistics/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<PerformanceStatistic>> {
    let found = find_visible(&state, &user, id).await?;
    Ok(success("Performance statistic retrieved successfully", found))
}

/// PUT /api/performance-statistics/{id}
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateStatistic>,
) -> AppResult<ApiJson<PerformanceStatistic>> {
    let existing = find_visible(&state, &user, id).await?;
    if let Some(value) = input.value {
        answerable_question(&state, existing.question_id, value).await?;
    }

    let updated = PerformanceStatisticRepo::update(&state.pool, id, &input, user.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = user.user_id, statistic_id = id, "Performance statistic updated");
    Ok(success("Performance statistic updated successfully", updated))
}

/// DELETE /api/performance-statistics/{id}
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    find_visible(&state, &user, id).await?;
    if !PerformanceStatisticRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = user.user_id, statistic_id = id, "Performance statistic deleted");
    Ok(success("Performance statistic deleted successfully", ()))
}
