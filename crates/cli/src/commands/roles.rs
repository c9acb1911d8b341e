//! `roles list` - print the built-in role permission tables.

use meridian_backoffice::services::auth::AuthError;
use meridian_core::BuiltinRole;

/// Prints each built-in role and its fixed permission table.
///
/// # Errors
///
/// Infallible in practice; typed to match the other commands.
pub fn list() -> Result<(), AuthError> {
    for role in BuiltinRole::all() {
        println!("{}", role.as_str());
        for permission in role.permissions() {
            println!("  {}", permission.as_str());
        }
        println!();
    }
    Ok(())
}
