//! Types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};

/// A message in a conversation with the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender ("user" or "assistant").
    pub role: String,
    /// The content of the message.
    pub content: MessageContent,
}

impl Message {
    /// Builds a user-role text message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// Builds an assistant-role text message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_owned(),
            content: MessageContent::Text(text.into()),
        }
    }
}

/// Content of a message - either plain text or a list of content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content.
    Text(String),
    /// Multiple content blocks.
    Blocks(Vec<ContentBlock>),
}

/// A content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
}

/// Request body for the Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Response from the Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique response ID.
    pub id: String,
    /// Model that generated the response.
    pub model: String,
    /// Reason the response stopped.
    pub stop_reason: Option<String>,
    /// Response content blocks.
    pub content: Vec<ContentBlock>,
    /// Token usage information.
    pub usage: Usage,
}

impl ChatResponse {
    /// Concatenates all text blocks into one assistant reply.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect()
    }
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}
