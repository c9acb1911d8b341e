//! Error types for the WhatsApp client.

use axum::http::StatusCode;
use thiserror::Error;

use crate::services::outbound::GatewayError;

/// Errors that can occur when sending WhatsApp messages.
#[derive(Debug, Error)]
pub enum WhatsAppError {
    /// The provider is missing a phone number ID or access token.
    #[error("WhatsApp provider is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("request error: {0}")]
    Request(String),

    /// Response could not be parsed.
    #[error("response error: {0}")]
    Response(String),

    /// Graph API returned an error.
    #[error("API error: {0}")]
    Api(String),

    /// The endpoint is inside its failure-suppression window.
    #[error("provider calls suspended after repeated failures")]
    Suppressed,
}

impl WhatsAppError {
    /// Fixed HTTP status for each error class.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured | Self::Suppressed => StatusCode::SERVICE_UNAVAILABLE,
            Self::Request(_) | Self::Response(_) | Self::Api(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Fixed user-facing message for each error class.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => "WhatsApp provider is not configured".to_owned(),
            Self::Suppressed => {
                "WhatsApp provider temporarily suspended after repeated failures".to_owned()
            }
            Self::Request(_) | Self::Response(_) | Self::Api(_) => {
                "Messaging provider error".to_owned()
            }
        }
    }
}

impl From<GatewayError> for WhatsAppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Suppressed { .. } => Self::Suppressed,
            GatewayError::Http(e) => Self::Request(e.to_string()),
        }
    }
}
