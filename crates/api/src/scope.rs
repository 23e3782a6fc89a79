//! Geography lookups behind the data-scope checks.

use pstats_core::error::CoreError;
use pstats_core::scope::{DataScope, GeoFilter, GeoLevel};
use pstats_core::types::DbId;
use pstats_db::repositories::{BattalionRepo, DistrictRepo, RangeRepo, StateRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn entity(level: GeoLevel) -> &'static str {
    match level {
        GeoLevel::State => "State",
        GeoLevel::District => "District",
        GeoLevel::Range => "Range",
        GeoLevel::Battalion => "Battalion",
    }
}

/// Full ancestor chain of one geography node, or `None` if it does not exist.
pub async fn locate(state: &AppState, level: GeoLevel, id: DbId) -> AppResult<Option<GeoFilter>> {
    let pool = &state.pool;
    let node = match level {
        GeoLevel::Battalion => BattalionRepo::find_location(pool, id).await?.map(|l| GeoFilter {
            state_id: Some(l.state_id),
            district_id: Some(l.district_id),
            range_id: Some(l.range_id),
            battalion_id: Some(l.battalion_id),
        }),
        GeoLevel::Range => match RangeRepo::find_by_id(pool, id).await? {
            Some(range) => DistrictRepo::find_by_id(pool, range.district_id)
                .await?
                .map(|district| GeoFilter {
                    state_id: Some(district.state_id),
                    district_id: Some(district.id),
                    range_id: Some(range.id),
                    battalion_id: None,
                }),
            None => None,
        },
        GeoLevel::District => DistrictRepo::find_by_id(pool, id).await?.map(|district| GeoFilter {
            state_id: Some(district.state_id),
            district_id: Some(district.id),
            ..Default::default()
        }),
        GeoLevel::State => StateRepo::find_by_id(pool, id)
            .await?
            .map(|s| GeoFilter::only(GeoLevel::State, s.id)),
    };
    Ok(node)
}

/// Complete a partially specified scope from the geography tree.
///
/// The finest pinned level determines the node; its ancestors are looked up
/// and any coarser ids the caller supplied must match them.
pub async fn resolve_scope(state: &AppState, requested: DataScope) -> AppResult<DataScope> {
    requested.validate().map_err(CoreError::Validation)?;

    let Some(level) = requested.level() else {
        return Ok(DataScope::default());
    };
    let id = requested.id(level).unwrap_or_default();
    let resolved = locate(state, level, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: entity(level), id }))?;

    for coarser in GeoLevel::ALL.into_iter().filter(|l| *l < level) {
        if let Some(asked) = requested.id(coarser) {
            if Some(asked) != resolved.id(coarser) {
                return Err(CoreError::Validation(format!(
                    "{}_id {asked} does not match the selected {}",
                    coarser.as_str(),
                    level.as_str()
                ))
                .into());
            }
        }
    }
    Ok(resolved)
}

/// Reject a filter whose ids below the caller's scope name nodes in another
/// subtree. Unknown nodes are treated as outside the scope.
pub async fn ensure_filter_in_scope(
    state: &AppState,
    filter: &GeoFilter,
    scope: &DataScope,
) -> AppResult<()> {
    if scope.is_unrestricted() {
        return Ok(());
    }
    for (level, id) in scope.pinned_below(filter) {
        let inside = locate(state, level, id)
            .await?
            .is_some_and(|node| scope.contains(&node));
        if !inside {
            return Err(CoreError::Forbidden(format!(
                "{} {id} is outside your data scope",
                level.as_str()
            ))
            .into());
        }
    }
    Ok(())
}
