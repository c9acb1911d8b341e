//! Unified error handling for the back-office API.
//!
//! Every handler failure is classified here and rendered as the
//! `{ "error": ..., "details": ... }` envelope; successes go through
//! [`ok`] as `{ "success": true, "data": ... }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::ai::AiError;
use crate::store::StoreError;
use crate::whatsapp::WhatsAppError;

/// Application-level error type for the back-office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// AI provider operation failed.
    #[error("AI provider error: {0}")]
    Ai(#[from] AiError),

    /// WhatsApp provider operation failed.
    #[error("WhatsApp provider error: {0}")]
    WhatsApp(#[from] WhatsAppError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Caller exceeded the request budget.
    #[error("rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds until the caller's window resets.
        retry_after: u64,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Ai(ai) => ai.status(),
            Self::WhatsApp(wa) => wa.status(),
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message; internal detail never leaks.
    fn message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Ai(ai) => ai.user_message(),
            Self::WhatsApp(wa) => wa.user_message(),
            Self::RateLimited { .. } => "rate limit exceeded".to_string(),
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Self::RateLimited { retry_after } => Some(json!({ "retryAfter": retry_after })),
            Self::Ai(AiError::RateLimited(retry_after)) => {
                Some(json!({ "retryAfter": retry_after }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server-side failures go to Sentry; client errors do not.
        if matches!(self, Self::Internal(_) | Self::Store(StoreError::Conflict(_))) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Back-office request error"
            );
        } else if matches!(self, Self::Ai(_) | Self::WhatsApp(_)) {
            tracing::warn!(error = %self, "Upstream provider error");
        }

        let status = self.status();
        let mut body = json!({ "error": self.message() });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

/// Success envelope for every 2xx JSON response.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

/// Wraps handler output in the `{ success, data }` envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess {
        success: true,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("booking-123".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("missing token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("admin only".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::BadRequest("missing field".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::RateLimited { retry_after: 12 }),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_internal_detail_never_leaks() {
        let err = AppError::Internal("connection refused to 10.0.0.3".into());
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let err = AppError::RateLimited { retry_after: 42 };
        let details = err.details().expect("details");
        assert_eq!(details["retryAfter"], 42);
    }

    #[test]
    fn test_success_envelope_shape() {
        let Json(body) = ok(json!({ "id": "x" }));
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], "x");
    }
}
