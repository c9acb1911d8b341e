//! OpenAI Images API client for cover-image generation.

use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::services::outbound::Gateway;

use super::error::{AiError, ApiErrorResponse};

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const IMAGE_SIZE: &str = "1536x1024";
const ENDPOINT_KEY: &str = "image:POST /v1/images/generations";

/// Client for generating cover images.
#[derive(Clone)]
pub struct ImageClient {
    gateway: Gateway,
    model: String,
}

/// One generated image, base64-encoded PNG.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Base64 payload as returned by the provider.
    pub b64_data: String,
}

#[derive(Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u8,
    size: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: String,
}

impl ImageClient {
    /// Creates a new image client for the given model.
    #[must_use]
    pub fn new(gateway: Gateway, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    /// Generates one image for the prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint is suppressed,
    /// or the provider rejects the request.
    #[instrument(skip(self, api_key, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
    ) -> Result<GeneratedImage, AiError> {
        let request = ImageRequest {
            model: self.model.clone(),
            prompt: prompt.to_owned(),
            n: 1,
            size: IMAGE_SIZE.to_owned(),
        };

        let response = self
            .gateway
            .execute(ENDPOINT_KEY, |client| {
                client
                    .post(OPENAI_IMAGES_URL)
                    .header(
                        AUTHORIZATION,
                        format!("Bearer {}", api_key.expose_secret()),
                    )
                    .json(&request)
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error_type, message) = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or_else(
                    |_| ("unknown".to_owned(), body.clone()),
                    |parsed| (parsed.error.error_type, parsed.error.message),
                );
            return Err(AiError::classify(status, &error_type, &message));
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("invalid image response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|datum| GeneratedImage {
                b64_data: datum.b64_json,
            })
            .ok_or_else(|| AiError::Parse("no image data in response".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_request_serializes_expected_fields() {
        let request = ImageRequest {
            model: "gpt-image-1".to_owned(),
            prompt: "Kyoto at dusk".to_owned(),
            n: 1,
            size: IMAGE_SIZE.to_owned(),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["model"], "gpt-image-1");
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "1536x1024");
    }

    #[test]
    fn image_response_deserializes() {
        let json = r#"{"created": 1700000000, "data": [{"b64_json": "aGVsbG8="}]}"#;
        let parsed: ImageResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].b64_json, "aGVsbG8=");
    }
}
