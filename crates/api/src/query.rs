//! Shared query parameter types for API handlers.

use pstats_core::error::CoreError;
use pstats_core::pagination;
use pstats_core::types::DbId;
use pstats_core::validation::search_pattern;
use pstats_db::models::common::ListQuery;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)`.
    pub fn page(&self) -> (i64, i64) {
        pagination::page(self.limit, self.offset)
    }
}

/// Turn raw listing parameters into the repository-level [`ListQuery`].
///
/// The search term becomes an escaped `ILIKE` pattern and the page bounds are
/// clamped.
pub fn list_query(
    search: Option<&str>,
    active: Option<bool>,
    parent_id: Option<DbId>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<ListQuery, AppError> {
    let search = search_pattern(search).map_err(CoreError::Validation)?;
    let (limit, offset) = pagination::page(limit, offset);
    Ok(ListQuery {
        search,
        active,
        parent_id,
        limit,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn list_query_escapes_and_clamps() {
        let q = list_query(Some(" 50%_off "), Some(true), Some(3), Some(1_000), Some(-1)).unwrap();
        assert_eq!(q.search.as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(q.active, Some(true));
        assert_eq!(q.parent_id, Some(3));
        assert_eq!(q.limit, pagination::MAX_PAGE_SIZE);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn blank_search_is_ignored() {
        let q = list_query(Some("   "), None, None, None, None).unwrap();
        assert!(q.search.is_none());
        assert_eq!(q.limit, pagination::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn overlong_search_is_rejected() {
        let long = "x".repeat(101);
        assert_matches!(
            list_query(Some(&long), None, None, None, None),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
