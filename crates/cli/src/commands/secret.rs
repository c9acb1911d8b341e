//! `secret generate` - produce a high-entropy signing secret.

use rand::Rng;
use rand::distr::Alphanumeric;

use meridian_backoffice::services::auth::AuthError;

const SECRET_LENGTH: usize = 48;

/// Prints a freshly generated secret suitable for
/// `BACKOFFICE_JWT_SECRET`.
///
/// # Errors
///
/// Infallible in practice; typed to match the other commands.
pub fn generate() -> Result<(), AuthError> {
    let secret: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();
    println!("{secret}");
    Ok(())
}
