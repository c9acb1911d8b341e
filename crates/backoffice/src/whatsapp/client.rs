//! Meta Graph API client for WhatsApp messages.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use crate::services::outbound::Gateway;

use super::error::WhatsAppError;
use super::types::{
    BroadcastOutcome, BroadcastSummary, GraphErrorResponse, SendMessageResponse, TextMessage,
};

const ENDPOINT_KEY: &str = "whatsapp:POST /messages";

/// WhatsApp client for sending text messages.
#[derive(Clone)]
pub struct WhatsAppClient {
    gateway: Gateway,
    api_base: String,
    phone_number_id: Option<String>,
}

impl std::fmt::Debug for WhatsAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppClient")
            .field("api_base", &self.api_base)
            .field("phone_number_id", &self.phone_number_id)
            .finish_non_exhaustive()
    }
}

impl WhatsAppClient {
    /// Creates a new WhatsApp client.
    #[must_use]
    pub fn new(gateway: Gateway, api_base: impl Into<String>, phone_number_id: Option<String>) -> Self {
        Self {
            gateway,
            api_base: api_base.into(),
            phone_number_id,
        }
    }

    fn messages_url(&self) -> Result<String, WhatsAppError> {
        let phone_number_id = self
            .phone_number_id
            .as_deref()
            .ok_or(WhatsAppError::NotConfigured)?;
        Ok(format!("{}/{phone_number_id}/messages", self.api_base))
    }

    /// Sends one text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unconfigured, the request
    /// fails, or the Graph API rejects the message.
    #[instrument(skip(self, access_token, body), fields(to = %to))]
    pub async fn send_text(
        &self,
        access_token: &SecretString,
        to: &str,
        body: &str,
    ) -> Result<SendMessageResponse, WhatsAppError> {
        let url = self.messages_url()?;
        let message = TextMessage::new(to, body);

        let response = self
            .gateway
            .execute(ENDPOINT_KEY, |client| {
                client
                    .post(&url)
                    .bearer_auth(access_token.expose_secret())
                    .json(&message)
            })
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GraphErrorResponse>(&body)
                .map_or(body, |parsed| parsed.error.message);
            error!(error = %message, "Graph API error sending message");
            return Err(WhatsAppError::Api(message));
        }

        let result: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| WhatsAppError::Response(e.to_string()))?;

        debug!(
            receipts = result.messages.len(),
            "Message accepted by Graph API"
        );

        Ok(result)
    }

    /// Sends the same text to every recipient, one call each, collecting
    /// per-recipient outcomes. A failed recipient does not stop the rest.
    #[instrument(skip(self, access_token, body), fields(recipients = recipients.len()))]
    pub async fn broadcast(
        &self,
        access_token: &SecretString,
        recipients: &[String],
        body: &str,
    ) -> BroadcastSummary {
        let mut outcomes = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            let outcome = match self.send_text(access_token, recipient, body).await {
                Ok(response) => BroadcastOutcome {
                    recipient: recipient.clone(),
                    sent: true,
                    message_id: response.messages.into_iter().next().map(|m| m.id),
                    error: None,
                },
                Err(e) => BroadcastOutcome {
                    recipient: recipient.clone(),
                    sent: false,
                    message_id: None,
                    error: Some(e.to_string()),
                },
            };
            outcomes.push(outcome);
        }

        BroadcastSummary::from_outcomes(outcomes)
    }
}
