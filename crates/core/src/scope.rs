//! Geographic data scope.
//!
//! Every non-admin user is attached to a node of the
//! state → district → range → battalion tree. Reads are restricted to that
//! subtree by injecting the user's ids into the query filter; writes are
//! checked against the full location of the target battalion.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Level of the geography tree a scope or grouping refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    State,
    District,
    Range,
    Battalion,
}

impl GeoLevel {
    pub const ALL: [GeoLevel; 4] = [
        GeoLevel::State,
        GeoLevel::District,
        GeoLevel::Range,
        GeoLevel::Battalion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GeoLevel::State => "state",
            GeoLevel::District => "district",
            GeoLevel::Range => "range",
            GeoLevel::Battalion => "battalion",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == value)
            .ok_or_else(|| {
                format!(
                    "Invalid level '{value}'. Must be one of: state, district, range, battalion"
                )
            })
    }
}

/// Optional id at each level of the geography tree.
///
/// Used both as a query filter and as the scope a user is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoFilter {
    pub state_id: Option<DbId>,
    pub district_id: Option<DbId>,
    pub range_id: Option<DbId>,
    pub battalion_id: Option<DbId>,
}

/// The subtree a user may see. An all-`None` scope is unrestricted.
pub type DataScope = GeoFilter;

/// Fully resolved position of a battalion in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub state_id: DbId,
    pub district_id: DbId,
    pub range_id: DbId,
    pub battalion_id: DbId,
}

impl GeoFilter {
    fn ids(&self) -> [(GeoLevel, Option<DbId>); 4] {
        [
            (GeoLevel::State, self.state_id),
            (GeoLevel::District, self.district_id),
            (GeoLevel::Range, self.range_id),
            (GeoLevel::Battalion, self.battalion_id),
        ]
    }

    fn set(&mut self, level: GeoLevel, id: Option<DbId>) {
        match level {
            GeoLevel::State => self.state_id = id,
            GeoLevel::District => self.district_id = id,
            GeoLevel::Range => self.range_id = id,
            GeoLevel::Battalion => self.battalion_id = id,
        }
    }

    /// The id pinned at `level`.
    pub fn id(&self, level: GeoLevel) -> Option<DbId> {
        self.ids()[level as usize].1
    }

    /// A filter pinning `level` only.
    pub fn only(level: GeoLevel, id: DbId) -> Self {
        let mut filter = GeoFilter::default();
        filter.set(level, Some(id));
        filter
    }

    /// Whether every level pinned here is pinned to the same id in `node`.
    pub fn contains(&self, node: &GeoFilter) -> bool {
        self.ids()
            .iter()
            .all(|(level, pinned)| pinned.map_or(true, |id| node.id(*level) == Some(id)))
    }

    /// Ids `filter` pins below this scope's finest level, coarsest first.
    pub fn pinned_below(&self, filter: &GeoFilter) -> Vec<(GeoLevel, DbId)> {
        let floor = self.level();
        filter
            .ids()
            .into_iter()
            .filter(|(level, _)| floor.map_or(true, |floor| *level > floor))
            .filter_map(|(level, id)| id.map(|id| (level, id)))
            .collect()
    }

    /// True when no level is pinned.
    pub fn is_unrestricted(&self) -> bool {
        self.ids().iter().all(|(_, id)| id.is_none())
    }

    /// The finest pinned level, if any.
    pub fn level(&self) -> Option<GeoLevel> {
        self.ids()
            .iter()
            .rev()
            .find(|(_, id)| id.is_some())
            .map(|(level, _)| *level)
    }

    /// Reject non-positive ids.
    pub fn validate(&self) -> Result<(), String> {
        for (level, id) in self.ids() {
            if let Some(id) = id {
                if id <= 0 {
                    return Err(format!("{}_id must be a positive integer", level.as_str()));
                }
            }
        }
        Ok(())
    }

    /// Whether the given battalion location lies inside this scope.
    pub fn permits(&self, location: &Location) -> bool {
        let actual = [
            location.state_id,
            location.district_id,
            location.range_id,
            location.battalion_id,
        ];
        self.ids()
            .iter()
            .zip(actual)
            .all(|((_, pinned), actual)| pinned.map_or(true, |id| id == actual))
    }
}

/// Narrow a requested filter to the caller's scope.
///
/// Each level pinned by `scope` is copied into the result. A request that
/// pins the same level to a different id is outside the caller's subtree and
/// is rejected. Levels below the scope are kept as requested; the caller
/// must check them against the tree (see [`GeoFilter::pinned_below`]).
pub fn enforce_geo_filter(
    requested: GeoFilter,
    scope: &DataScope,
) -> Result<GeoFilter, CoreError> {
    requested.validate().map_err(CoreError::Validation)?;

    let mut effective = requested;
    for (level, pinned) in scope.ids() {
        let Some(pinned) = pinned else { continue };
        let asked = requested.ids()[level as usize].1;
        match asked {
            Some(asked) if asked != pinned => {
                return Err(CoreError::Forbidden(format!(
                    "{} {asked} is outside your data scope",
                    level.as_str()
                )));
            }
            _ => effective.set(level, Some(pinned)),
        }
    }
    Ok(effective)
}

/// Reject a write to a battalion that lies outside the caller's scope.
pub fn ensure_within_scope(scope: &DataScope, location: &Location) -> Result<(), CoreError> {
    if scope.permits(location) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Battalion {} is outside your data scope",
            location.battalion_id
        )))
    }
}
