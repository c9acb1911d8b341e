//! Authentication extractors for route handlers.
//!
//! Tokens carry identity only. Both extractors load the live user
//! document and resolve permissions from current role state, so a role
//! edit or account deletion takes effect on the caller's next request.

use axum::{extract::FromRequestParts, http::request::Parts};

use meridian_core::{Permission, ResolvedPermissions, UserId};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::{TokenService, resolve_user_permissions};
use crate::state::AppState;

/// The authenticated caller with resolved permissions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The live user document.
    pub user: User,
    /// Permissions resolved from current role state.
    pub permissions: ResolvedPermissions,
}

impl CurrentUser {
    /// The caller's user ID.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.user.id
    }

    /// Requires one permission, or fails with 403.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the permission is missing.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.permissions.has(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "missing permission '{}'",
                permission.as_str()
            )))
        }
    }

    /// Requires at least one of the given permissions, or fails with 403.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when none of the permissions are held.
    pub fn require_any(&self, permissions: &[Permission]) -> Result<(), AppError> {
        if self.permissions.has_any(permissions) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "missing required permission".to_owned(),
            ))
        }
    }
}

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(current): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", current.user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = authenticate(parts, state)?;
        Ok(Self(current))
    }
}

/// Extractor that requires an authenticated admin.
///
/// The admin role is re-checked from the live user profile, not trusted
/// from the token.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = authenticate(parts, state)?;

        if !current.permissions.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can access this resource".to_owned(),
            ));
        }

        Ok(Self(current))
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    let token = TokenService::extract_bearer(header)
        .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_owned()))?;

    let claims = state
        .auth()
        .tokens()
        .validate(token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let user = state
        .store()
        .users()
        .get(&claims.sub)
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

    let permissions = resolve_user_permissions(state.store(), &user);

    Ok(CurrentUser { user, permissions })
}
