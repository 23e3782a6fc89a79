//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000004_create_access_control.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STATE_OFFICER: &str = "state_officer";
pub const ROLE_DISTRICT_OFFICER: &str = "district_officer";
pub const ROLE_RANGE_OFFICER: &str = "range_officer";
pub const ROLE_BATTALION_OFFICER: &str = "battalion_officer";

/// Whether any of the given role names grants administrative access.
pub fn is_admin<S: AsRef<str>>(roles: &[S]) -> bool {
    roles.iter().any(|r| r.as_ref() == ROLE_ADMIN)
}
