//! Provider credential administration route handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use meridian_core::Permission;

use crate::error::{AppError, ok};
use crate::middleware::RequireAdmin;
use crate::models::{ApiCredential, ProviderKind};
use crate::state::AppState;

fn parse_provider(value: &str) -> Result<ProviderKind, AppError> {
    ProviderKind::parse(value)
        .ok_or_else(|| AppError::BadRequest(format!("unknown provider '{value}'")))
}

/// `GET /api/credentials/{provider}/status` - masked credential state.
#[instrument(skip(state, current))]
pub async fn status(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CredentialManage)?;

    let provider = parse_provider(&provider)?;
    Ok(ok(state.credentials().status(provider)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCredentialRequest {
    pub api_key: Option<String>,
    /// Defaults to enabling the rotated credential.
    pub enabled: Option<bool>,
}

/// `PUT /api/credentials/{provider}` - rotate, enable, or disable the
/// store-managed credential. The stored value takes precedence over the
/// deployed environment key while enabled.
#[instrument(skip(state, current, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(provider): Path<String>,
    Json(body): Json<UpdateCredentialRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CredentialManage)?;

    let provider = parse_provider(&provider)?;
    let existing = state.store().api_credentials().get(provider.as_str());

    let api_key = match (body.api_key, &existing) {
        (Some(key), _) if !key.trim().is_empty() => key,
        (None | Some(_), Some(credential)) => credential.api_key.clone(),
        (None | Some(_), None) => {
            return Err(AppError::BadRequest("api_key is required".to_owned()));
        }
    };

    state.store().api_credentials().upsert(ApiCredential {
        provider,
        api_key,
        enabled: body.enabled.unwrap_or(true),
        updated_by: Some(current.id().clone()),
        updated_at: Utc::now(),
    });

    tracing::info!(provider = provider.as_str(), by = %current.id(), "credential rotated");

    Ok(ok(state.credentials().status(provider)))
}
