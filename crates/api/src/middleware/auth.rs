//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pstats_core::error::CoreError;
use pstats_core::roles;
use pstats_core::scope::DataScope;
use pstats_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Role names (e.g. `"admin"`, `"district_officer"`).
    pub roles: Vec<String>,
    /// Geographic subtree the user is attached to.
    pub scope: DataScope,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        roles::is_admin(&self.roles)
    }

    /// The scope applied to reads and writes: unrestricted for admins, the
    /// user's own subtree otherwise.
    ///
    /// A non-admin without a geography node sees nothing and is refused.
    pub fn data_scope(&self) -> Result<DataScope, CoreError> {
        if self.is_admin() {
            Ok(DataScope::default())
        } else if self.scope.is_unrestricted() {
            Err(CoreError::Forbidden(
                "Your account is not attached to a geographic scope".into(),
            ))
        } else {
            Ok(self.scope)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        // Roles and scope are the ones in force when the token was issued.
        // A role change or a move of the user's geography node reaches the
        // caller at their next login or refresh, within the access-token
        // lifetime.
        Ok(AuthUser {
            user_id: claims.sub,
            roles: claims.roles,
            scope: claims.scope,
        })
    }
}
