//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKOFFICE_BASE_URL` - Public URL for the back-office API
//! - `BACKOFFICE_JWT_SECRET` - Bearer-token signing secret (min 32 chars, high entropy)
//! - `PRIMARY_ADMIN_EMAIL` - The admin account that can never be deleted
//!
//! ## Optional
//! - `PRIMARY_ADMIN_PASSWORD` - Bootstrap password (generated and logged once when absent)
//! - `BACKOFFICE_HOST` - Bind address (default: 127.0.0.1)
//! - `BACKOFFICE_PORT` - Listen port (default: 3001)
//! - `BACKOFFICE_DATA_DIR` - Upload storage directory (default: data)
//! - `ANTHROPIC_API_KEY` - Generative-AI provider key (store override wins)
//! - `ANTHROPIC_MODEL` - Model ID (default: claude-sonnet-4-20250514)
//! - `OPENAI_API_KEY` - Image-generation provider key (store override wins)
//! - `OPENAI_IMAGE_MODEL` - Image model ID (default: gpt-image-1)
//! - `WHATSAPP_PHONE_NUMBER_ID` - Sender phone number ID on the Graph API
//! - `WHATSAPP_ACCESS_TOKEN` - Graph API token (store override wins)
//! - `RATE_LIMIT_MAX_REQUESTS` - Fixed-window budget (default: 60)
//! - `RATE_LIMIT_WINDOW_SECS` - Fixed-window length (default: 60)
//! - `SYNC_READY_TIMEOUT_SECS` - Readiness fallback timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_AI_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
const DEFAULT_WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Back-office application configuration.
#[derive(Debug, Clone)]
pub struct BackofficeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back-office API
    pub base_url: String,
    /// Bearer-token signing secret
    pub jwt_secret: SecretString,
    /// The designated primary admin account (delete-guarded)
    pub primary_admin_email: String,
    /// Bootstrap password for the primary admin; generated and logged
    /// once when absent
    pub primary_admin_password: Option<SecretString>,
    /// Directory for uploaded collateral and documents
    pub data_dir: PathBuf,
    /// Generative-AI provider configuration
    pub ai: AiConfig,
    /// Image-generation provider configuration
    pub image: ImageConfig,
    /// WhatsApp provider configuration
    pub whatsapp: WhatsAppConfig,
    /// Fixed-window rate limit applied to `/api`
    pub rate_limit: RateLimitConfig,
    /// Seconds before the sync manager reports ready without all collections
    pub ready_timeout_secs: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Generative-AI (Anthropic Messages API) configuration.
///
/// The key is optional here: a store-managed credential takes precedence
/// over the deployed value, so a deployment may carry no env key at all.
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AiConfig {
    /// Deployed API key, overridden by the `api_credentials` collection
    pub api_key: Option<SecretString>,
    /// Model ID (e.g., claude-sonnet-4-20250514)
    pub model: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .finish()
    }
}

/// Image-generation (OpenAI Images API) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ImageConfig {
    /// Deployed API key, overridden by the `api_credentials` collection
    pub api_key: Option<SecretString>,
    /// Image model ID (e.g., gpt-image-1)
    pub model: String,
}

impl std::fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .finish()
    }
}

/// WhatsApp (Meta Graph API) configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct WhatsAppConfig {
    /// Graph API base URL (overridable for tests)
    pub api_base: String,
    /// Sender phone number ID
    pub phone_number_id: Option<String>,
    /// Deployed access token, overridden by the `api_credentials` collection
    pub access_token: Option<SecretString>,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("api_base", &self.api_base)
            .field("phone_number_id", &self.phone_number_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests allowed per window per caller
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

impl BackofficeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("BACKOFFICE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKOFFICE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BACKOFFICE_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKOFFICE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("BACKOFFICE_BASE_URL")?;
        let jwt_secret = get_validated_secret("BACKOFFICE_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "BACKOFFICE_JWT_SECRET")?;
        let primary_admin_email = get_required_env("PRIMARY_ADMIN_EMAIL")?;
        let primary_admin_password = get_optional_env("PRIMARY_ADMIN_PASSWORD").map(|password| {
            if let Err(e) = validate_secret_strength(&password, "PRIMARY_ADMIN_PASSWORD") {
                tracing::warn!("PRIMARY_ADMIN_PASSWORD validation warning: {e}");
            }
            SecretString::from(password)
        });
        let data_dir = PathBuf::from(get_env_or_default("BACKOFFICE_DATA_DIR", "data"));

        let ai = AiConfig::from_env();
        let image = ImageConfig::from_env();
        let whatsapp = WhatsAppConfig::from_env();
        let rate_limit = RateLimitConfig::from_env()?;
        let ready_timeout_secs = get_env_or_default("SYNC_READY_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SYNC_READY_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            jwt_secret,
            primary_admin_email,
            primary_admin_password,
            data_dir,
            ai,
            image,
            whatsapp,
            rate_limit,
            ready_timeout_secs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AiConfig {
    fn from_env() -> Self {
        let api_key = get_optional_env("ANTHROPIC_API_KEY").map(|key| {
            if let Err(e) = validate_secret_strength(&key, "ANTHROPIC_API_KEY") {
                tracing::warn!("ANTHROPIC_API_KEY validation warning: {e}");
            }
            SecretString::from(key)
        });

        Self {
            api_key,
            model: get_env_or_default("ANTHROPIC_MODEL", DEFAULT_AI_MODEL),
        }
    }
}

impl ImageConfig {
    fn from_env() -> Self {
        let api_key = get_optional_env("OPENAI_API_KEY").map(|key| {
            if let Err(e) = validate_secret_strength(&key, "OPENAI_API_KEY") {
                tracing::warn!("OPENAI_API_KEY validation warning: {e}");
            }
            SecretString::from(key)
        });

        Self {
            api_key,
            model: get_env_or_default("OPENAI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
        }
    }
}

impl WhatsAppConfig {
    fn from_env() -> Self {
        let access_token = get_optional_env("WHATSAPP_ACCESS_TOKEN").map(|token| {
            if let Err(e) = validate_secret_strength(&token, "WHATSAPP_ACCESS_TOKEN") {
                tracing::warn!("WHATSAPP_ACCESS_TOKEN validation warning: {e}");
            }
            SecretString::from(token)
        });

        Self {
            api_base: get_env_or_default("WHATSAPP_API_BASE", DEFAULT_WHATSAPP_API_BASE),
            phone_number_id: get_optional_env("WHATSAPP_PHONE_NUMBER_ID"),
            access_token,
        }
    }
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_requests = get_env_or_default("RATE_LIMIT_MAX_REQUESTS", "60")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("RATE_LIMIT_MAX_REQUESTS".to_string(), e.to_string())
            })?;
        let window_secs = get_env_or_default("RATE_LIMIT_WINDOW_SECS", "60")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("RATE_LIMIT_WINDOW_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            max_requests,
            window_secs,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_uniform_string_is_zero() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_random_string_is_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholder_secrets_are_rejected() {
        assert!(validate_secret_strength("changeme-123456", "TEST").is_err());
        assert!(validate_secret_strength("your-api-key-here", "TEST").is_err());
    }

    #[test]
    fn test_low_entropy_secrets_are_rejected() {
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST").is_err());
    }

    #[test]
    fn test_strong_secret_is_accepted() {
        assert!(validate_secret_strength("fJ8#kQ2m!xZ7@pW4$nR9^vB1&cT6*yH3", "TEST").is_ok());
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let secret = SecretString::from("too-short");
        assert!(validate_jwt_secret(&secret, "TEST").is_err());
    }

    #[test]
    fn test_rate_limit_defaults() {
        let limits = RateLimitConfig::default();
        assert_eq!(limits.max_requests, 60);
        assert_eq!(limits.window_secs, 60);
    }
}
