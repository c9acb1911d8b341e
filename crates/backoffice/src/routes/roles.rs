//! Role administration route handlers.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use meridian_core::{BuiltinRole, CustomRole, CustomRoleId, Permission};

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `GET /api/roles` - built-in tables and custom roles.
#[instrument(skip(state, _current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> impl IntoResponse {
    let builtin: Vec<_> = BuiltinRole::all()
        .iter()
        .map(|role| {
            json!({
                "name": role.as_str(),
                "permissions": role.permissions(),
            })
        })
        .collect();

    let custom = state.store().custom_roles().list();

    ok(json!({ "builtin": builtin, "custom": custom }))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

/// `POST /api/roles/custom` - create a custom role.
#[instrument(skip(state, current, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::RoleManage)?;

    let name = body
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_owned()))?;

    if state
        .store()
        .custom_roles()
        .find(|role| role.name.eq_ignore_ascii_case(&name))
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "a role named '{name}' already exists"
        )));
    }

    let now = Utc::now();
    let role = state.store().custom_roles().insert(CustomRole {
        id: CustomRoleId::generate(),
        name,
        description: body.description,
        permissions: body.permissions,
        system: false,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(role = %role.name, by = %current.id(), "custom role created");

    Ok(ok(role))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<BTreeSet<Permission>>,
}

/// `PUT /api/roles/custom/{id}` - update a custom role.
///
/// System roles cannot be renamed; the admin system role is fully
/// immutable.
#[instrument(skip(state, current, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<CustomRoleId>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::RoleManage)?;

    let role = state
        .store()
        .custom_roles()
        .get(id.as_str())
        .ok_or_else(|| AppError::NotFound(format!("role '{id}'")))?;

    if role.is_admin_role() {
        return Err(AppError::Forbidden(
            "the admin role cannot be modified".to_owned(),
        ));
    }

    if role.system && body.name.as_deref().is_some_and(|name| name != role.name) {
        return Err(AppError::Forbidden(
            "system roles cannot be renamed".to_owned(),
        ));
    }

    let updated = state.store().custom_roles().update(id.as_str(), |role| {
        if let Some(name) = body.name {
            role.name = name;
        }
        if let Some(description) = body.description {
            role.description = description;
        }
        if let Some(permissions) = body.permissions {
            role.permissions = permissions;
        }
        role.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

/// `DELETE /api/roles/custom/{id}` - delete a custom role.
///
/// Seeded system roles cannot be deleted. Users referencing the deleted
/// role simply lose its grants on their next permission resolution.
#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<CustomRoleId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::RoleManage)?;

    let role = state
        .store()
        .custom_roles()
        .get(id.as_str())
        .ok_or_else(|| AppError::NotFound(format!("role '{id}'")))?;

    if role.system {
        return Err(AppError::Forbidden(
            "system roles cannot be deleted".to_owned(),
        ));
    }

    state.store().custom_roles().delete(id.as_str())?;
    tracing::info!(role = %role.name, by = %current.id(), "custom role deleted");

    Ok(ok(json!({ "deleted": true })))
}
