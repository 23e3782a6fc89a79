//! Row shapes produced by the report queries.

use serde::Serialize;
use sqlx::FromRow;
use pstats_core::types::{Date, DbId};

/// `summary`: totals per question with its module and topic.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SummaryRow {
    pub module_id: DbId,
    pub module_name: String,
    pub topic_id: DbId,
    pub topic_name: String,
    pub question_id: DbId,
    pub question_text: String,
    pub question_type: String,
    pub record_count: i64,
    pub total_value: f64,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

/// `detailed`: one statistic with every ancestor resolved to a name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetailedRow {
    pub id: DbId,
    pub reporting_date: Date,
    pub state_name: String,
    pub district_name: String,
    pub range_name: String,
    pub battalion_id: DbId,
    pub battalion_name: String,
    pub module_name: String,
    pub topic_name: String,
    pub sub_topic_name: Option<String>,
    pub question_id: DbId,
    pub question_text: String,
    pub value: f64,
    pub remarks: Option<String>,
    pub submitted_by_name: String,
}

/// `geographic`: totals per node at the requested level.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeographicRow {
    pub geo_id: DbId,
    pub geo_name: String,
    pub record_count: i64,
    pub battalions_reporting: i64,
    pub total_value: f64,
    pub average_value: f64,
}

/// `trend`: totals per time bucket. `period` is the first day of the bucket.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrendRow {
    pub period: Date,
    pub record_count: i64,
    pub total_value: f64,
    pub average_value: f64,
}

/// `submission`: how much each battalion has reported.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionRow {
    pub battalion_id: DbId,
    pub battalion_name: String,
    pub range_name: String,
    pub district_name: String,
    pub state_name: String,
    pub record_count: i64,
    pub questions_answered: i64,
    pub last_reporting_date: Option<Date>,
}
