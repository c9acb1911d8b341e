//! Authentication route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use meridian_core::{Permission, UserId};

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::UserView;
use crate::services::auth::resolve_user_permissions;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionView {
    token: String,
    user: UserView,
    permissions: Vec<Permission>,
    is_admin: bool,
}

/// `POST /api/auth/login` - email/password sign-in.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = body
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("email is required".to_owned()))?;
    let password = body
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("password is required".to_owned()))?;

    let (user, token) = state.auth().login(email, password)?;
    let permissions = resolve_user_permissions(state.store(), &user);

    Ok(ok(SessionView {
        token,
        user: UserView::from(&user),
        is_admin: permissions.is_admin(),
        permissions: permissions.iter().collect(),
    }))
}

/// `GET /api/auth/me` - current profile with resolved permissions.
#[instrument(skip(current))]
pub async fn me(RequireAuth(current): RequireAuth) -> impl IntoResponse {
    ok(json!({
        "user": UserView::from(&current.user),
        "is_admin": current.permissions.is_admin(),
        "permissions": current.permissions.iter().collect::<Vec<_>>(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    /// Defaults to the caller's own account.
    pub user_id: Option<UserId>,
    /// Required for self-service changes.
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// `POST /api/auth/password` - password update.
///
/// Callers change their own password by proving the current one; admins
/// (or `user.manage` holders) may reset anyone's.
#[instrument(skip(state, current, body))]
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_password = body
        .new_password
        .as_deref()
        .filter(|p| p.len() >= 8)
        .ok_or_else(|| {
            AppError::BadRequest("new_password must be at least 8 characters".to_owned())
        })?;

    let target = body.user_id.unwrap_or_else(|| current.id().clone());
    let self_service = &target == current.id();

    if self_service {
        let current_password = body.current_password.as_deref().ok_or_else(|| {
            AppError::BadRequest("current_password is required".to_owned())
        })?;
        // Re-authenticate before accepting the change.
        state
            .auth()
            .login(current.user.email.as_str(), current_password)?;
    } else {
        current.require(Permission::UserManage)?;
        if state.store().users().get(target.as_str()).is_none() {
            return Err(AppError::NotFound(format!("user '{target}'")));
        }
    }

    state.auth().update_password(&target, new_password)?;
    tracing::info!(user = %target, by = %current.id(), "password updated");

    Ok(ok(json!({ "updated": true })))
}
