//! Bearer-token issuing and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::User;

const ISSUER: &str = "meridian-backoffice";
const AUDIENCE: &str = "meridian-backoffice-clients";
const EXPIRY_HOURS: i64 = 24;

/// Claims stored in a bearer token.
///
/// Identity only - roles and permissions are re-resolved from the live
/// user document on every request, so a role change takes effect without
/// waiting for token expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User document ID.
    pub sub: String,
    /// Sign-in email at issue time.
    pub email: String,
    /// Token type, always "access".
    pub token_type: String,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issued at timestamp.
    pub iat: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

/// Token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Issues and validates HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Creates a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
        }
    }

    /// Issues an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::GenerationFailed` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(EXPIRY_HOURS);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            token_type: "access".to_owned(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: ISSUER.to_owned(),
            aud: AUDIENCE.to_owned(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::GenerationFailed(e.to_string()))
    }

    /// Validates and decodes a bearer token.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Extracts the token from an Authorization header value.
    #[must_use]
    pub fn extract_bearer(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use meridian_core::{BuiltinRole, Email, UserId};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::from("user-1"),
            email: Email::parse("agent@meridianvoyages.travel").expect("valid email"),
            name: "Agent".to_owned(),
            phone_numbers: vec![],
            roles: vec![BuiltinRole::Agent],
            custom_role_ids: vec![],
            direct_permissions: vec![],
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(
            "kQ2m8fJx7ZpW4nR9vB1cT6yH3aD5gE0u".to_owned(),
        ))
    }

    #[test]
    fn issue_and_validate_roundtrip() {
        let tokens = service();
        let token = tokens.issue(&user()).expect("issue");
        let claims = tokens.validate(&token).expect("validate");

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "agent@meridianvoyages.travel");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = service().issue(&user()).expect("issue");
        let other = TokenService::new(&SecretString::from(
            "Xy9Qm3kJ2fWp8Zn4Rt7Vb1Cs6Hd5Ga0E".to_owned(),
        ));
        assert!(matches!(
            other.validate(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(
            service().validate("not-a-token"),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(
            TokenService::extract_bearer("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(TokenService::extract_bearer("Basic abc"), None);
    }
}
