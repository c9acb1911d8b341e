//! Provider credential resolution.
//!
//! Keys live in two places: the deployed environment and the
//! `api_credentials` collection. The store value always wins when
//! present and enabled, so a revoked key can be rotated from the
//! back-office without touching the deployment.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::BackofficeConfig;
use crate::models::ProviderKind;
use crate::store::Store;

/// Where a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    Store,
    Environment,
    Missing,
}

/// Masked credential state for the admin UI.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub provider: ProviderKind,
    pub configured: bool,
    pub source: CredentialSource,
    /// Last four characters of the active key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_key: Option<String>,
    /// SHA-256 fingerprint of the active key, for comparing against
    /// provider dashboards without revealing the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// When the store credential was last rotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Resolves provider credentials with store-over-environment precedence.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Store,
    env_ai: Option<SecretString>,
    env_image: Option<SecretString>,
    env_whatsapp: Option<SecretString>,
}

impl CredentialResolver {
    /// Creates a resolver from the deployed configuration.
    #[must_use]
    pub fn new(store: Store, config: &BackofficeConfig) -> Self {
        Self {
            store,
            env_ai: config.ai.api_key.clone(),
            env_image: config.image.api_key.clone(),
            env_whatsapp: config.whatsapp.access_token.clone(),
        }
    }

    fn deployed(&self, provider: ProviderKind) -> Option<&SecretString> {
        match provider {
            ProviderKind::Ai => self.env_ai.as_ref(),
            ProviderKind::Image => self.env_image.as_ref(),
            ProviderKind::Whatsapp => self.env_whatsapp.as_ref(),
        }
    }

    /// Resolves the active key for a provider, store value first.
    #[must_use]
    pub fn resolve(&self, provider: ProviderKind) -> Option<SecretString> {
        if let Some(credential) = self.store.api_credentials().get(provider.as_str()) {
            if credential.enabled {
                return Some(SecretString::from(credential.api_key));
            }
        }
        self.deployed(provider).cloned()
    }

    /// Reports the active credential state without exposing the key.
    #[must_use]
    pub fn status(&self, provider: ProviderKind) -> CredentialStatus {
        let stored = self
            .store
            .api_credentials()
            .get(provider.as_str())
            .filter(|credential| credential.enabled);

        let (source, key, updated_at) = match stored {
            Some(credential) => (
                CredentialSource::Store,
                Some(SecretString::from(credential.api_key)),
                Some(credential.updated_at),
            ),
            None => match self.deployed(provider) {
                Some(key) => (CredentialSource::Environment, Some(key.clone()), None),
                None => (CredentialSource::Missing, None, None),
            },
        };

        let masked_key = key.as_ref().map(|k| mask_key(k.expose_secret()));
        let fingerprint = key.as_ref().map(|k| fingerprint(k.expose_secret()));

        CredentialStatus {
            provider,
            configured: !matches!(source, CredentialSource::Missing),
            source,
            masked_key,
            fingerprint,
            updated_at,
        }
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{visible}")
}

fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(digest)
}
