//! Provider API credential documents.
//!
//! Credentials stored here override the deployed environment values, so
//! a revoked key can be rotated from the back-office without a deploy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_core::UserId;

/// External providers whose credentials can be managed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Generative-AI provider (itinerary plans, chat).
    Ai,
    /// Image-generation provider (cover images).
    Image,
    /// WhatsApp messaging provider.
    Whatsapp,
}

impl ProviderKind {
    /// Stable storage value, also used as the document ID.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Image => "image",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Parses a path segment into a provider.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ai" => Some(Self::Ai),
            "image" => Some(Self::Image),
            "whatsapp" => Some(Self::Whatsapp),
            _ => None,
        }
    }
}

/// A runtime-managed provider credential in the `api_credentials`
/// collection, keyed by provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCredential {
    /// Which provider this credential belongs to.
    pub provider: ProviderKind,
    /// The raw key or token.
    pub api_key: String,
    /// Disabled credentials fall back to the deployed value.
    pub enabled: bool,
    /// Who last rotated the credential.
    #[serde(default)]
    pub updated_by: Option<UserId>,
    /// When the credential was last rotated.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parse_roundtrip() {
        for provider in [ProviderKind::Ai, ProviderKind::Image, ProviderKind::Whatsapp] {
            assert_eq!(ProviderKind::parse(provider.as_str()), Some(provider));
        }
        assert_eq!(ProviderKind::parse("sms"), None);
    }
}
