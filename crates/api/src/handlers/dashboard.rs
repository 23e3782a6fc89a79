//! Handler for the `/dashboard` resource.

use axum::extract::State;
use pstats_db::models::dashboard::DashboardSummary;
use pstats_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireScope;
use crate::response::{success, ApiJson};
use crate::state::AppState;

/// GET /api/dashboard/summary
///
/// Reference-data counts are global; statistic counts follow the caller's
/// scope.
pub async fn summary(
    RequireScope { user, scope }: RequireScope,
    State(state): State<AppState>,
) -> AppResult<ApiJson<DashboardSummary>> {
    let summary = DashboardRepo::summary(&state.pool, &scope, user.user_id).await?;
    Ok(success("Dashboard summary retrieved successfully", summary))
}
