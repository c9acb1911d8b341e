//! Graph API message types and broadcast outcomes.

use serde::{Deserialize, Serialize};

/// Outgoing text message payload.
#[derive(Debug, Serialize)]
pub struct TextMessage {
    /// Always "whatsapp" on the Graph API.
    pub messaging_product: &'static str,
    /// Recipient phone number in E.164 form.
    pub to: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub message_type: &'static str,
    /// Text body.
    pub text: TextBody,
}

impl TextMessage {
    /// Builds a plain text message for one recipient.
    #[must_use]
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            messaging_product: "whatsapp",
            to: to.into(),
            message_type: "text",
            text: TextBody { body: body.into() },
        }
    }
}

/// Text body wrapper.
#[derive(Debug, Serialize)]
pub struct TextBody {
    pub body: String,
}

/// Successful send response.
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    /// Message receipts, one per recipient.
    #[serde(default)]
    pub messages: Vec<MessageReceipt>,
}

/// One accepted message ID.
#[derive(Debug, Deserialize)]
pub struct MessageReceipt {
    /// Provider-assigned message ID.
    pub id: String,
}

/// Graph API error envelope.
#[derive(Debug, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphError,
}

/// Graph API error details.
#[derive(Debug, Deserialize)]
pub struct GraphError {
    pub message: String,
}

/// Per-recipient result of a broadcast.
#[derive(Debug, Serialize)]
pub struct BroadcastOutcome {
    /// Recipient phone number.
    pub recipient: String,
    /// Whether the provider accepted the message.
    pub sent: bool,
    /// Provider message ID when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Failure description when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate broadcast result.
#[derive(Debug, Serialize)]
pub struct BroadcastSummary {
    /// Number of accepted messages.
    pub sent: usize,
    /// Number of failed messages.
    pub failed: usize,
    /// Per-recipient outcomes in request order.
    pub outcomes: Vec<BroadcastOutcome>,
}

impl BroadcastSummary {
    /// Aggregates per-recipient outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<BroadcastOutcome>) -> Self {
        let sent = outcomes.iter().filter(|o| o.sent).count();
        Self {
            sent,
            failed: outcomes.len() - sent,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_serializes_graph_shape() {
        let message = TextMessage::new("+14155550100", "Fares drop Friday");
        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(json["messaging_product"], "whatsapp");
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"]["body"], "Fares drop Friday");
    }

    #[test]
    fn summary_counts_outcomes() {
        let summary = BroadcastSummary::from_outcomes(vec![
            BroadcastOutcome {
                recipient: "+1".to_owned(),
                sent: true,
                message_id: Some("wamid.1".to_owned()),
                error: None,
            },
            BroadcastOutcome {
                recipient: "+2".to_owned(),
                sent: false,
                message_id: None,
                error: Some("invalid recipient".to_owned()),
            },
        ]);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
    }
}
