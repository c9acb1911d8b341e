//! Authentication service.
//!
//! Wraps the credential check, profile lookup/creation, and bearer-token
//! issue into one service. Permission state is never read from the
//! token: every authenticated request re-resolves from the live user and
//! custom-role documents.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;

use meridian_core::{BuiltinRole, CustomRole, CustomRoleId, Email, Permission, ResolvedPermissions, UserId, resolve_permissions};

use crate::models::User;
use crate::store::Store;

const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: Email,
    pub name: String,
    pub phone_numbers: Vec<String>,
    pub roles: Vec<BuiltinRole>,
    pub custom_role_ids: Vec<CustomRoleId>,
    pub direct_permissions: Vec<Permission>,
    /// When absent, a random password is generated and returned once.
    pub password: Option<String>,
}

/// Authentication service over the user collection.
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    tokens: TokenService,
    passwords: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Creates an auth service with the given hashing seam.
    #[must_use]
    pub fn new(store: Store, tokens: TokenService, passwords: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            tokens,
            passwords,
        }
    }

    /// The token service used for issue/validation.
    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Signs a user in with email and password.
    ///
    /// Performs exactly one credential verification per call and issues a
    /// bearer token on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// failed check; the two cases are indistinguishable to the caller.
    pub fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let needle = email.trim();
        let user = self
            .store
            .users()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(needle))
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify_password(password, &user.password_hash)? {
            tracing::warn!(email = %needle, "failed sign-in attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Fetches the profile for an authenticated identity, creating it on
    /// first sign-in with the default customer role.
    ///
    /// # Errors
    ///
    /// Returns an error if profile creation fails.
    pub fn ensure_profile(&self, email: &Email, name: &str) -> Result<User, AuthError> {
        if let Some(existing) = self
            .store
            .users()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email.as_str()))
        {
            return Ok(existing);
        }

        tracing::info!(email = %email, "creating profile on first sign-in");
        let (user, _generated) = self.create_user(CreateUserInput {
            email: email.clone(),
            name: name.to_owned(),
            phone_numbers: vec![],
            roles: vec![BuiltinRole::Customer],
            custom_role_ids: vec![],
            direct_permissions: vec![],
            password: None,
        })?;
        Ok(user)
    }

    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` when the email is already in use.
    pub fn create_user(
        &self,
        input: CreateUserInput,
    ) -> Result<(User, Option<String>), AuthError> {
        if self
            .store
            .users()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(input.email.as_str()))
            .is_some()
        {
            return Err(AuthError::EmailTaken(input.email.to_string()));
        }

        let (password, generated) = match input.password {
            Some(password) => (password, None),
            None => {
                let password = generate_password();
                (password.clone(), Some(password))
            }
        };

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            email: input.email,
            name: input.name,
            phone_numbers: input.phone_numbers,
            roles: input.roles,
            custom_role_ids: input.custom_role_ids,
            direct_permissions: input.direct_permissions,
            password_hash: self.passwords.hash_password(&password)?,
            created_at: now,
            updated_at: now,
        };

        let user = self.store.users().insert(user)?;
        Ok((user, generated))
    }

    /// Replaces a user's password.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    pub fn update_password(&self, user_id: &UserId, new_password: &str) -> Result<(), AuthError> {
        let password_hash = self.passwords.hash_password(new_password)?;
        self.store.users().update(user_id.as_str(), |user| {
            user.password_hash = password_hash;
            user.updated_at = Utc::now();
        })?;
        Ok(())
    }
}

/// Resolves the effective permissions for a user from live role state.
#[must_use]
pub fn resolve_user_permissions(store: &Store, user: &User) -> ResolvedPermissions {
    let custom_roles: Vec<CustomRole> = user
        .custom_role_ids
        .iter()
        .filter_map(|id| store.custom_roles().get(id.as_str()))
        .collect();
    let custom_refs: Vec<&CustomRole> = custom_roles.iter().collect();

    resolve_permissions(&user.roles, &custom_refs, &user.direct_permissions)
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
