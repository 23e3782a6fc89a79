//! Content entities: modules, topics, sub-topics and questions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateModule {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateModule {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A row from the `topics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: DbId,
    pub module_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTopic {
    #[validate(range(min = 1))]
    pub module_id: DbId,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTopic {
    #[validate(range(min = 1))]
    pub module_id: Option<DbId>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// SubTopic
// ---------------------------------------------------------------------------

/// A row from the `sub_topics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubTopic {
    pub id: DbId,
    pub topic_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubTopic {
    #[validate(range(min = 1))]
    pub topic_id: DbId,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubTopic {
    #[validate(range(min = 1))]
    pub topic_id: Option<DbId>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub topic_id: DbId,
    pub sub_topic_id: Option<DbId>,
    pub question_text: String,
    pub question_type: String,
    pub sort_order: i32,
    pub is_mandatory: bool,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestion {
    #[validate(range(min = 1))]
    pub topic_id: DbId,
    #[validate(range(min = 1))]
    pub sub_topic_id: Option<DbId>,
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    /// Defaults to `numeric` if omitted.
    pub question_type: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub is_mandatory: Option<bool>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuestion {
    #[validate(range(min = 1))]
    pub sub_topic_id: Option<DbId>,
    #[validate(length(min = 1, max = 1000))]
    pub question_text: Option<String>,
    pub question_type: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub sort_order: Option<i32>,
    pub is_mandatory: Option<bool>,
}

/// The ancestry and type of a question, used when recording statistics.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionContext {
    pub question_id: DbId,
    pub module_id: DbId,
    pub topic_id: DbId,
    pub sub_topic_id: Option<DbId>,
    pub question_type: String,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Query parameters accepted by every content listing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContentListParams {
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 1))]
    pub module_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub topic_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub sub_topic_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolved question filter. Questions can be narrowed by any ancestor.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionFilter {
    pub module_id: Option<DbId>,
    pub topic_id: Option<DbId>,
    pub sub_topic_id: Option<DbId>,
}
