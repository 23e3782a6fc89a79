//! Dashboard summary model.

use serde::Serialize;
use sqlx::FromRow;

/// Counts shown on the landing dashboard.
///
/// Master-data counts cover active rows only. Statistic counts are limited
/// to the caller's scope; `unread_communications` is the caller's own.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardSummary {
    pub states: i64,
    pub districts: i64,
    pub ranges: i64,
    pub battalions: i64,
    pub modules: i64,
    pub topics: i64,
    pub sub_topics: i64,
    pub questions: i64,
    pub active_users: i64,
    pub statistics_total: i64,
    pub statistics_last_30_days: i64,
    pub battalions_reporting_last_30_days: i64,
    pub unread_communications: i64,
}
