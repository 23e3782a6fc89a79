//! Report parameter parsing and validation.
//!
//! Reports are read-only aggregations over performance statistics. Handlers
//! receive raw query-string values ([`ReportParams`]); [`ReportRequest::parse`]
//! validates them, applies the caller's data scope, and produces the typed
//! request the repository layer turns into SQL.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scope::{enforce_geo_filter, DataScope, GeoFilter, GeoLevel};
use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest period a single report may span, in days.
pub const MAX_REPORT_SPAN_DAYS: i64 = 366;

/// Default and maximum page size for detailed reports.
pub const DEFAULT_REPORT_LIMIT: i64 = 100;
pub const MAX_REPORT_LIMIT: i64 = 500;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of aggregation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Totals per module / topic / question.
    Summary,
    /// Individual statistic rows with resolved names, paginated.
    Detailed,
    /// Totals per geography node at the requested level.
    Geographic,
    /// Totals per time bucket.
    Trend,
    /// Submission counts per battalion, including battalions with none.
    Submission,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Summary,
        ReportType::Detailed,
        ReportType::Geographic,
        ReportType::Trend,
        ReportType::Submission,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Summary => "summary",
            ReportType::Detailed => "detailed",
            ReportType::Geographic => "geographic",
            ReportType::Trend => "trend",
            ReportType::Submission => "submission",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ReportType::Summary => "Totals and averages per module, topic and question",
            ReportType::Detailed => "Individual statistic entries with resolved names",
            ReportType::Geographic => "Totals per state, district, range or battalion",
            ReportType::Trend => "Totals per day, week or month",
            ReportType::Submission => "Number of submissions per battalion",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                format!(
                    "Invalid report type '{value}'. Must be one of: {}",
                    valid.join(", ")
                )
            })
    }
}

/// Bucket width for trend reports. The string form is a PostgreSQL
/// `date_trunc` unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendInterval {
    Day,
    Week,
    Month,
}

impl TrendInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendInterval::Day => "day",
            TrendInterval::Week => "week",
            TrendInterval::Month => "month",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "day" => Ok(TrendInterval::Day),
            "week" => Ok(TrendInterval::Week),
            "month" => Ok(TrendInterval::Month),
            other => Err(format!(
                "Invalid interval '{other}'. Must be one of: day, week, month"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw and validated parameters
// ---------------------------------------------------------------------------

/// Raw report query parameters as received on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportParams {
    pub report_type: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub state_id: Option<DbId>,
    pub district_id: Option<DbId>,
    pub range_id: Option<DbId>,
    pub battalion_id: Option<DbId>,
    pub module_id: Option<DbId>,
    pub topic_id: Option<DbId>,
    pub sub_topic_id: Option<DbId>,
    pub question_id: Option<DbId>,
    /// Geography level for `geographic` reports (default `state`).
    pub group_by: Option<String>,
    /// Bucket width for `trend` reports (default `month`).
    pub interval: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Filters shared by every report type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportFilter {
    #[serde(flatten)]
    pub geo: GeoFilter,
    pub module_id: Option<DbId>,
    pub topic_id: Option<DbId>,
    pub sub_topic_id: Option<DbId>,
    pub question_id: Option<DbId>,
    pub from_date: Option<Date>,
    pub to_date: Option<Date>,
}

/// A validated, scope-restricted report request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub filter: ReportFilter,
    pub group_by: GeoLevel,
    pub interval: TrendInterval,
    pub limit: i64,
    pub offset: i64,
}

impl ReportRequest {
    /// Validate raw parameters and narrow them to `scope`.
    pub fn parse(params: &ReportParams, scope: &DataScope) -> Result<Self, CoreError> {
        let report_type = params
            .report_type
            .as_deref()
            .ok_or_else(|| CoreError::Validation("report_type is required".into()))
            .and_then(|t| ReportType::parse(t).map_err(CoreError::Validation))?;

        let from_date = parse_date("from_date", params.from_date.as_deref())?;
        let to_date = parse_date("to_date", params.to_date.as_deref())?;
        validate_period(report_type, from_date, to_date)?;

        for (name, id) in [
            ("module_id", params.module_id),
            ("topic_id", params.topic_id),
            ("sub_topic_id", params.sub_topic_id),
            ("question_id", params.question_id),
        ] {
            if id.is_some_and(|id| id <= 0) {
                return Err(CoreError::Validation(format!(
                    "{name} must be a positive integer"
                )));
            }
        }

        let requested_geo = GeoFilter {
            state_id: params.state_id,
            district_id: params.district_id,
            range_id: params.range_id,
            battalion_id: params.battalion_id,
        };
        let geo = enforce_geo_filter(requested_geo, scope)?;

        let group_by = match params.group_by.as_deref() {
            Some(level) => GeoLevel::parse(level).map_err(CoreError::Validation)?,
            None => GeoLevel::State,
        };
        let interval = match params.interval.as_deref() {
            Some(interval) => TrendInterval::parse(interval).map_err(CoreError::Validation)?,
            None => TrendInterval::Month,
        };

        let limit = params.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
        if !(1..=MAX_REPORT_LIMIT).contains(&limit) {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_REPORT_LIMIT}"
            )));
        }
        let offset = params.offset.unwrap_or(0);
        if offset < 0 {
            return Err(CoreError::Validation("offset must not be negative".into()));
        }

        Ok(Self {
            report_type,
            filter: ReportFilter {
                geo,
                module_id: params.module_id,
                topic_id: params.topic_id,
                sub_topic_id: params.sub_topic_id,
                question_id: params.question_id,
                from_date,
                to_date,
            },
            group_by,
            interval,
            limit,
            offset,
        })
    }
}

/// Parse a `YYYY-MM-DD` date parameter.
pub fn parse_date(name: &str, value: Option<&str>) -> Result<Option<Date>, CoreError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if !DATE_RE.is_match(raw) {
        return Err(CoreError::Validation(format!(
            "{name} must use the YYYY-MM-DD format"
        )));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CoreError::Validation(format!("{name} is not a valid calendar date")))
}

fn validate_period(
    report_type: ReportType,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<(), CoreError> {
    if report_type == ReportType::Trend && (from.is_none() || to.is_none()) {
        return Err(CoreError::Validation(
            "Trend reports require both from_date and to_date".into(),
        ));
    }
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(CoreError::Validation(
                "from_date must not be after to_date".into(),
            ));
        }
        if (to - from).num_days() > MAX_REPORT_SPAN_DAYS {
            return Err(CoreError::Validation(format!(
                "Report period cannot exceed {MAX_REPORT_SPAN_DAYS} days"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
