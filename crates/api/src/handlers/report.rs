//! Handlers for the `/reports` resource.

use axum::extract::State;
use pstats_core::report::{ReportFilter, ReportParams, ReportRequest, ReportType, TrendInterval};
use pstats_core::scope::GeoLevel;
use pstats_db::models::report::{DetailedRow, GeographicRow, SubmissionRow, SummaryRow, TrendRow};
use pstats_db::repositories::ReportRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::QueryParams;
use crate::middleware::rbac::{RequireAuth, RequireScope};
use crate::response::{success, ApiJson};
use crate::scope::ensure_filter_in_scope;
use crate::state::AppState;

/// Rows of one report; the shape depends on the report type.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportRows {
    Summary(Vec<SummaryRow>),
    Detailed(Vec<DetailedRow>),
    Geographic(Vec<GeographicRow>),
    Trend(Vec<TrendRow>),
    Submission(Vec<SubmissionRow>),
}

/// Response body for `GET /reports`.
///
/// `filters` echoes the effective filter after the caller's scope was
/// applied. `total` is only reported for `detailed`.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report_type: ReportType,
    pub filters: ReportFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GeoLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<TrendInterval>,
    pub rows: ReportRows,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct ReportTypeInfo {
    pub report_type: ReportType,
    pub description: &'static str,
}

/// GET /api/reports?report_type=...
pub async fn generate(
    RequireScope { user, scope }: RequireScope,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ReportParams>,
) -> AppResult<ApiJson<ReportResponse>> {
    let request = ReportRequest::parse(&params, &scope)?;
    ensure_filter_in_scope(&state, &request.filter.geo, &scope).await?;
    let pool = &state.pool;
    let filter = &request.filter;

    let mut group_by = None;
    let mut interval = None;
    let mut total = None;
    let rows = match request.report_type {
        ReportType::Summary => ReportRows::Summary(ReportRepo::summary(pool, filter).await?),
        ReportType::Detailed => {
            total = Some(ReportRepo::detailed_count(pool, filter).await?);
            ReportRows::Detailed(
                ReportRepo::detailed(pool, filter, request.limit, request.offset).await?,
            )
        }
        ReportType::Geographic => {
            group_by = Some(request.group_by);
            ReportRows::Geographic(ReportRepo::geographic(pool, filter, request.group_by).await?)
        }
        ReportType::Trend => {
            interval = Some(request.interval);
            ReportRows::Trend(ReportRepo::trend(pool, filter, request.interval).await?)
        }
        ReportType::Submission => ReportRows::Submission(
            ReportRepo::submission(pool, filter, request.limit, request.offset).await?,
        ),
    };

    tracing::debug!(
        user_id = user.user_id,
        report_type = request.report_type.as_str(),
        "Report generated"
    );
    Ok(success(
        "Report generated successfully",
        ReportResponse {
            report_type: request.report_type,
            filters: request.filter,
            group_by,
            interval,
            rows,
            total,
            limit: request.limit,
            offset: request.offset,
        },
    ))
}

/// GET /api/reports/types
pub async fn types(RequireAuth(_user): RequireAuth) -> ApiJson<Vec<ReportTypeInfo>> {
    let types = ReportType::ALL
        .into_iter()
        .map(|report_type| ReportTypeInfo {
            report_type,
            description: report_type.description(),
        })
        .collect();
    success("Report types retrieved successfully", types)
}
