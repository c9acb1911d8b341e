//! Anthropic Messages API client.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::services::outbound::Gateway;

use super::error::{AiError, ApiErrorResponse};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const ENDPOINT_KEY: &str = "ai:POST /v1/messages";

/// Client for the Anthropic Messages API.
///
/// The API key is supplied per call: credential resolution prefers a
/// store-managed key over the deployed one, and the store value can
/// change at runtime.
#[derive(Clone)]
pub struct AiClient {
    gateway: Gateway,
    model: String,
    api_url: String,
}

impl AiClient {
    /// Creates a new client for the given model.
    #[must_use]
    pub fn new(gateway: Gateway, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            api_url: ANTHROPIC_API_URL.to_owned(),
        }
    }

    /// The configured model ID.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a chat request and returns the complete response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint is inside its
    /// failure-suppression window, or the provider returns an error
    /// response (classified into a fixed error class).
    #[instrument(skip(self, api_key, messages, system), fields(model = %self.model))]
    pub async fn chat(
        &self,
        api_key: &SecretString,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> Result<ChatResponse, AiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
        };

        let response = self
            .gateway
            .execute(ENDPOINT_KEY, |client| {
                client
                    .post(&self.api_url)
                    .header("x-api-key", api_key.expose_secret())
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&request)
            })
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| AiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(Self::map_error_response(status, response).await)
        }
    }

    /// Maps a provider error response into a fixed error class.
    async fn map_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AiError {
        // Rate limits carry Retry-After; honor it when present.
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        match response.text().await {
            Ok(body) => {
                let (error_type, message) = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map_or_else(
                        |_| ("unknown".to_owned(), body.clone()),
                        |parsed| (parsed.error.error_type, parsed.error.message),
                    );

                match AiError::classify(status, &error_type, &message) {
                    AiError::RateLimited(default_secs) => {
                        AiError::RateLimited(retry_after.unwrap_or(default_secs))
                    }
                    other => other,
                }
            }
            Err(e) => AiError::Http(e),
        }
    }
}
