//! Authorization extractors layered on top of [`AuthUser`].
//!
//! Endpoint access is role based (`admin` or any signed-in user); which
//! statistics a signed-in user may touch is decided by their data scope,
//! enforced by [`RequireScope`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pstats_core::error::CoreError;
use pstats_core::scope::DataScope;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Admin-only endpoints: reference-data writes and user administration.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(RequireAdmin(user))
        } else {
            Err(CoreError::Forbidden("Admin role required".into()).into())
        }
    }
}

/// Any signed-in user, whatever their roles.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(RequireAuth)
    }
}

/// A signed-in user together with the scope their statistic access is
/// limited to. Admins get the unrestricted scope; a non-admin without a
/// geography node is refused with 403 (see [`AuthUser::data_scope`]).
pub struct RequireScope {
    pub user: AuthUser,
    pub scope: DataScope,
}

impl FromRequestParts<AppState> for RequireScope {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let scope = user.data_scope()?;
        Ok(RequireScope { user, scope })
    }
}
