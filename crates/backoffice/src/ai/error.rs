//! Error types and provider-error classification for the AI clients.

use axum::http::StatusCode;
use thiserror::Error;

use crate::services::outbound::GatewayError;

/// Errors that can occur when calling the AI providers.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error the classifier did not single out.
    #[error("API error ({error_type}): {message}")]
    Api {
        /// Error type from the provider.
        error_type: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured key was rejected (revoked, leaked, or invalid).
    #[error("credentials rejected: {0}")]
    CredentialsRejected(String),

    /// No key is configured in the store or the environment.
    #[error("no API key configured")]
    MissingCredentials,

    /// The endpoint is inside its failure-suppression window.
    #[error("provider calls suspended after repeated failures")]
    Suppressed,

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl AiError {
    /// Fixed HTTP status for each error class.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingCredentials | Self::Suppressed => StatusCode::SERVICE_UNAVAILABLE,
            Self::CredentialsRejected(_) | Self::Api { .. } | Self::Http(_) | Self::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Fixed user-facing message for each error class.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited(_) => "AI provider rate limit reached, try again shortly".to_owned(),
            Self::CredentialsRejected(_) => {
                "AI provider rejected the configured API credentials; rotate the key in credential settings"
                    .to_owned()
            }
            Self::MissingCredentials => "AI provider is not configured".to_owned(),
            Self::Suppressed => {
                "AI provider temporarily suspended after repeated failures".to_owned()
            }
            Self::Api { .. } | Self::Http(_) | Self::Parse(_) => "AI provider error".to_owned(),
        }
    }

    /// Classifies a provider error body into a fixed error class.
    ///
    /// Key-revocation and leak notices arrive as plain error messages, so
    /// classification pattern-matches the message text.
    #[must_use]
    pub fn classify(status: reqwest::StatusCode, error_type: &str, message: &str) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || error_type == "rate_limit_error" {
            return Self::RateLimited(60);
        }

        let lower = message.to_lowercase();
        let credential_failure = status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
            || error_type == "authentication_error"
            || error_type == "permission_error"
            || lower.contains("revoked")
            || lower.contains("leaked")
            || lower.contains("api key");

        if credential_failure {
            return Self::CredentialsRejected(message.to_owned());
        }

        Self::Api {
            error_type: error_type.to_owned(),
            message: message.to_owned(),
        }
    }
}

impl From<GatewayError> for AiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Suppressed { .. } => Self::Suppressed,
            GatewayError::Http(e) => Self::Http(e),
        }
    }
}

/// API error response envelope from the provider.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiErrorDetail,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorDetail {
    /// Error type.
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_classifies_to_429() {
        let err = AiError::classify(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "rate_limit_error",
            "Number of requests exceeded",
        );
        assert!(matches!(err, AiError::RateLimited(_)));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn revoked_key_message_classifies_as_credentials() {
        let err = AiError::classify(
            reqwest::StatusCode::BAD_REQUEST,
            "invalid_request_error",
            "This API key has been revoked by the organization owner",
        );
        assert!(matches!(err, AiError::CredentialsRejected(_)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn leaked_key_message_classifies_as_credentials() {
        let err = AiError::classify(
            reqwest::StatusCode::FORBIDDEN,
            "permission_error",
            "Key disabled: detected as leaked in a public repository",
        );
        assert!(matches!(err, AiError::CredentialsRejected(_)));
    }

    #[test]
    fn unauthorized_status_classifies_as_credentials() {
        let err = AiError::classify(
            reqwest::StatusCode::UNAUTHORIZED,
            "authentication_error",
            "invalid x-api-key",
        );
        assert!(matches!(err, AiError::CredentialsRejected(_)));
    }

    #[test]
    fn other_provider_errors_stay_generic() {
        let err = AiError::classify(
            reqwest::StatusCode::BAD_REQUEST,
            "invalid_request_error",
            "max_tokens is too large",
        );
        assert!(matches!(err, AiError::Api { .. }));
        assert_eq!(err.user_message(), "AI provider error");
    }

    #[test]
    fn credential_errors_use_the_fixed_user_message() {
        let err = AiError::CredentialsRejected("revoked".to_owned());
        assert!(err.user_message().contains("rotate the key"));
    }

    #[test]
    fn api_error_envelope_deserializes() {
        let json = r#"{
            "type": "error",
            "error": {
                "type": "invalid_request_error",
                "message": "max_tokens is too large"
            }
        }"#;

        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.error_type, "invalid_request_error");
        assert_eq!(response.error.message, "max_tokens is too large");
    }
}
