//! Performance statistics: one numeric answer per battalion, question and
//! reporting date.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::scope::Location;
use pstats_core::types::{Date, DbId, Timestamp};

use crate::models::content::QuestionContext;

/// A row from the `performance_statistics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PerformanceStatistic {
    pub id: DbId,
    pub battalion_id: DbId,
    pub range_id: DbId,
    pub district_id: DbId,
    pub state_id: DbId,
    pub question_id: DbId,
    pub module_id: DbId,
    pub topic_id: DbId,
    pub sub_topic_id: Option<DbId>,
    pub reporting_date: Date,
    pub value: f64,
    pub remarks: Option<String>,
    pub submitted_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PerformanceStatistic {
    pub fn location(&self) -> Location {
        Location {
            state_id: self.state_id,
            district_id: self.district_id,
            range_id: self.range_id,
            battalion_id: self.battalion_id,
        }
    }
}

/// Result of an upsert: the stored row and whether it was newly inserted.
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedStatistic {
    #[sqlx(flatten)]
    pub statistic: PerformanceStatistic,
    pub inserted: bool,
}

/// Request body for `POST /performance-statistics`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitStatistic {
    #[validate(range(min = 1))]
    pub battalion_id: DbId,
    #[validate(range(min = 1))]
    pub question_id: DbId,
    pub reporting_date: Date,
    pub value: f64,
    #[validate(length(max = 1000))]
    pub remarks: Option<String>,
}

/// One answer inside a bulk submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatisticEntry {
    #[validate(range(min = 1))]
    pub question_id: DbId,
    pub value: f64,
    #[validate(length(max = 1000))]
    pub remarks: Option<String>,
}

/// Request body for `POST /performance-statistics/bulk`: several answers for
/// one battalion and reporting date.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkSubmitStatistics {
    #[validate(range(min = 1))]
    pub battalion_id: DbId,
    pub reporting_date: Date,
    #[validate(length(min = 1, max = 500), nested)]
    pub entries: Vec<StatisticEntry>,
}

/// Request body for `PUT /performance-statistics/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStatistic {
    pub value: Option<f64>,
    #[validate(length(max = 1000))]
    pub remarks: Option<String>,
}

/// Fully resolved insert DTO. Ancestors are denormalised onto the row.
#[derive(Debug, Clone)]
pub struct NewStatistic {
    pub location: Location,
    pub question: QuestionContext,
    pub reporting_date: Date,
    pub value: f64,
    pub remarks: Option<String>,
    pub submitted_by: DbId,
}

/// Query parameters for `GET /performance-statistics` and its `/statistics`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StatisticListParams {
    pub state_id: Option<DbId>,
    pub district_id: Option<DbId>,
    pub range_id: Option<DbId>,
    pub battalion_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub module_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub topic_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub sub_topic_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub question_id: Option<DbId>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Aggregate returned by `GET /performance-statistics/statistics`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatisticSummary {
    pub total_records: i64,
    pub battalions_reporting: i64,
    pub questions_answered: i64,
    pub total_value: f64,
    pub first_reporting_date: Option<Date>,
    pub last_reporting_date: Option<Date>,
}
