//! User administration route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use meridian_core::{BuiltinRole, CustomRoleId, Email, PageRequest, Permission, UserId, paginate};

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::{User, UserView};
use crate::services::auth::CreateUserInput;
use crate::state::AppState;

/// `GET /api/users` - paginated user listing.
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::UserView)?;

    let users = state.store().users().list();
    let (items, page_info) = paginate(&users, page);
    let views: Vec<UserView> = items.iter().map(UserView::from).collect();

    Ok(ok(json!({ "items": views, "pageInfo": page_info })))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub roles: Vec<BuiltinRole>,
    #[serde(default)]
    pub custom_role_ids: Vec<CustomRoleId>,
    #[serde(default)]
    pub direct_permissions: Vec<Permission>,
    pub password: Option<String>,
}

/// `POST /api/users` - create a user account.
///
/// When no password is supplied one is generated and returned exactly
/// once in the response.
#[instrument(skip(state, current, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::UserManage)?;

    let email = body
        .email
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("email is required".to_owned()))?;
    let email = Email::parse(email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_owned()))?;

    let (user, generated_password) = state.auth().create_user(CreateUserInput {
        email,
        name,
        phone_numbers: body.phone_numbers,
        roles: body.roles,
        custom_role_ids: body.custom_role_ids,
        direct_permissions: body.direct_permissions,
        password: body.password,
    })?;

    tracing::info!(user = %user.id, by = %current.id(), "user created");

    Ok(ok(json!({
        "user": UserView::from(&user),
        "generatedPassword": generated_password,
    })))
}

/// `GET /api/users/{id}` - user detail.
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::UserView)?;

    let user = fetch(&state, &id)?;
    Ok(ok(UserView::from(&user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone_numbers: Option<Vec<String>>,
    pub roles: Option<Vec<BuiltinRole>>,
    pub custom_role_ids: Option<Vec<CustomRoleId>>,
    pub direct_permissions: Option<Vec<Permission>>,
}

/// `PUT /api/users/{id}` - update profile, roles, and grants.
#[instrument(skip(state, current, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::UserManage)?;

    let updated = state.store().users().update(id.as_str(), |user| {
        if let Some(name) = body.name {
            user.name = name;
        }
        if let Some(phone_numbers) = body.phone_numbers {
            user.phone_numbers = phone_numbers;
        }
        if let Some(roles) = body.roles {
            user.roles = roles;
        }
        if let Some(custom_role_ids) = body.custom_role_ids {
            user.custom_role_ids = custom_role_ids;
        }
        if let Some(direct_permissions) = body.direct_permissions {
            user.direct_permissions = direct_permissions;
        }
        user.updated_at = Utc::now();
    })?;

    Ok(ok(UserView::from(&updated)))
}

/// `DELETE /api/users/{id}` - delete an account.
///
/// The designated primary admin account can never be deleted.
#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::UserManage)?;

    let user = fetch(&state, &id)?;
    if user
        .email
        .as_str()
        .eq_ignore_ascii_case(&state.config().primary_admin_email)
    {
        return Err(AppError::Forbidden(
            "the primary admin account cannot be deleted".to_owned(),
        ));
    }

    state.store().users().delete(id.as_str())?;
    tracing::info!(user = %id, by = %current.id(), "user deleted");

    Ok(ok(json!({ "deleted": true })))
}

fn fetch(state: &AppState, id: &UserId) -> Result<User, AppError> {
    state
        .store()
        .users()
        .get(id.as_str())
        .ok_or_else(|| AppError::NotFound(format!("user '{id}'")))
}
