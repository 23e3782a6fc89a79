//! Shapes shared by several resources.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Aggregate counts returned by every `GET /<resource>/statistics` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct ActiveCounts {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

/// Request body for `PATCH /<resource>/{id}/status`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct SetActive {
    pub active: bool,
}

/// Resolved listing filter handed to repositories.
///
/// Built by handlers from raw query parameters: `search` is already an
/// escaped `ILIKE` pattern and `limit` / `offset` are already clamped.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub active: Option<bool>,
    /// Id of the parent row for nested resources (e.g. `state_id` for districts).
    pub parent_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}
