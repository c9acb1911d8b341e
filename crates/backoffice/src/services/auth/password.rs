//! Password hashing behind an injectable seam.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version};

use super::error::AuthError;

/// Hashing seam so tests can observe or stub credential checks.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hash` if hashing fails.
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Verifies a password against a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hash` if the stored hash is malformed.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id hasher with OWASP-recommended parameters:
/// m=19456 (19 MiB), t=2, p=1.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a new Argon2id hasher with recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Self { argon2 }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AuthError::Hash(format!("failed to hash password: {error}")))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|error| AuthError::Hash(format!("failed to parse password hash: {error}")))?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AuthError::Hash(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}
