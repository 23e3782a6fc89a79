/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (e.g. the reporting date of a statistic) carry no zone.
pub type Date = chrono::NaiveDate;
