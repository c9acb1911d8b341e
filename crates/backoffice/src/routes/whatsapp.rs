//! WhatsApp broadcast route handler.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use meridian_core::Permission;

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::ProviderKind;
use crate::state::AppState;
use crate::whatsapp::WhatsAppError;

const MAX_RECIPIENTS: usize = 200;
const MAX_MESSAGE_LENGTH: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub recipients: Vec<String>,
    pub message: Option<String>,
}

/// `POST /api/whatsapp/broadcast` - send one text to many recipients.
///
/// Results are reported per recipient; a failed send does not abort the
/// rest of the batch.
#[instrument(skip(state, current, body))]
pub async fn broadcast(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::MessageBroadcast)?;

    let message = body
        .message
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("message is required".to_owned()))?;
    if message.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }

    if body.recipients.is_empty() {
        return Err(AppError::BadRequest(
            "at least one recipient is required".to_owned(),
        ));
    }
    if body.recipients.len() > MAX_RECIPIENTS {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_RECIPIENTS} recipients per broadcast"
        )));
    }
    if let Some(bad) = body
        .recipients
        .iter()
        .find(|r| !looks_like_e164(r))
    {
        return Err(AppError::BadRequest(format!(
            "recipient '{bad}' is not an E.164 phone number"
        )));
    }

    let access_token = state
        .credentials()
        .resolve(ProviderKind::Whatsapp)
        .ok_or(WhatsAppError::NotConfigured)?;

    let summary = state
        .whatsapp()
        .broadcast(&access_token, &body.recipients, &message)
        .await;

    tracing::info!(
        sent = summary.sent,
        failed = summary.failed,
        by = %current.id(),
        "WhatsApp broadcast completed"
    );

    Ok(ok(summary))
}

fn looks_like_e164(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('+') else {
        return false;
    };
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e164_validation() {
        assert!(looks_like_e164("+14155550100"));
        assert!(looks_like_e164("+918800123456"));
        assert!(!looks_like_e164("14155550100"));
        assert!(!looks_like_e164("+1-415-555"));
        assert!(!looks_like_e164("+12"));
    }
}
