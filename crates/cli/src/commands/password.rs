//! `password hash` - produce an argon2 PHC string.

use meridian_backoffice::services::auth::{Argon2PasswordHasher, AuthError, PasswordHasher};

/// Hashes a password with the same parameters the service uses.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash(password: &str) -> Result<(), AuthError> {
    let hasher = Argon2PasswordHasher::new();
    let hash = hasher.hash_password(password)?;
    println!("{hash}");
    Ok(())
}
