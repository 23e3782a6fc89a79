//! Geography entities: states, districts, ranges and battalions.
//!
//! Each level references its parent by id; names are unique within the
//! parent and codes are unique globally.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use pstats_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A row from the `states` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct State {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new state.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateState {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 2, max = 20))]
    pub code: String,
    /// Defaults to `true` if omitted.
    pub active: Option<bool>,
}

/// DTO for updating a state. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateState {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 20))]
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// District
// ---------------------------------------------------------------------------

/// A row from the `districts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct District {
    pub id: DbId,
    pub state_id: DbId,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDistrict {
    #[validate(range(min = 1))]
    pub state_id: DbId,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 2, max = 20))]
    pub code: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDistrict {
    #[validate(range(min = 1))]
    pub state_id: Option<DbId>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 20))]
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A row from the `ranges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Range {
    pub id: DbId,
    pub district_id: DbId,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRange {
    #[validate(range(min = 1))]
    pub district_id: DbId,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 2, max = 20))]
    pub code: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRange {
    #[validate(range(min = 1))]
    pub district_id: Option<DbId>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 20))]
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Battalion
// ---------------------------------------------------------------------------

/// A row from the `battalions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Battalion {
    pub id: DbId,
    pub range_id: DbId,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBattalion {
    #[validate(range(min = 1))]
    pub range_id: DbId,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 2, max = 20))]
    pub code: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBattalion {
    #[validate(range(min = 1))]
    pub range_id: Option<DbId>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 20))]
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Query parameters accepted by every geography listing.
///
/// Parent ids that do not apply to the listed level are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GeoListParams {
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 1))]
    pub state_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub district_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub range_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
