//! Seeding for system roles and the primary admin account.

use std::collections::BTreeSet;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use meridian_core::{BuiltinRole, CustomRole, CustomRoleId, Email, Permission};

use crate::services::auth::{AuthError, AuthService, CreateUserInput};
use crate::store::Store;

/// Seeds the system custom-roles that mirror the built-in tables.
///
/// Idempotent: existing roles are left untouched, missing ones are
/// created. Returns the names that were created.
pub fn seed_system_roles(store: &Store) -> Vec<String> {
    let definitions: [(&str, &str, &[Permission]); 4] = [
        (
            CustomRole::ADMIN_NAME,
            "Full access to every back-office capability",
            Permission::all(),
        ),
        (
            "agent",
            "Sells itineraries and manages customers and bookings",
            BuiltinRole::Agent.permissions(),
        ),
        (
            "relationship-manager",
            "Owns customer relationships and document verification",
            BuiltinRole::RelationshipManager.permissions(),
        ),
        (
            "customer",
            "Browses published itineraries",
            BuiltinRole::Customer.permissions(),
        ),
    ];

    let mut created = Vec::new();
    for (name, description, permissions) in definitions {
        let exists = store
            .custom_roles()
            .find(|role| role.system && role.name == name)
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        store.custom_roles().upsert(CustomRole {
            id: CustomRoleId::generate(),
            name: name.to_owned(),
            description: description.to_owned(),
            permissions: permissions.iter().copied().collect::<BTreeSet<_>>(),
            system: true,
            created_at: now,
            updated_at: now,
        });
        created.push(name.to_owned());
    }

    if !created.is_empty() {
        tracing::info!(roles = ?created, "seeded system roles");
    }

    created
}

/// Creates the primary admin account when it does not exist.
///
/// Uses the configured bootstrap password when provided; otherwise a
/// password is generated and returned once for the operator to record.
///
/// # Errors
///
/// Returns an error if the email is invalid or the account cannot be
/// created.
pub fn ensure_primary_admin(
    auth: &AuthService,
    store: &Store,
    email: &str,
    password: Option<&SecretString>,
) -> Result<Option<String>, AuthError> {
    if store
        .users()
        .find(|u| u.email.as_str().eq_ignore_ascii_case(email))
        .is_some()
    {
        return Ok(None);
    }

    let email = Email::parse(email)
        .map_err(|e| AuthError::Hash(format!("invalid primary admin email: {e}")))?;

    let (user, generated) = auth.create_user(CreateUserInput {
        email,
        name: "Primary Admin".to_owned(),
        phone_numbers: vec![],
        roles: vec![BuiltinRole::Admin],
        custom_role_ids: vec![],
        direct_permissions: vec![],
        password: password.map(|p| p.expose_secret().to_owned()),
    })?;

    tracing::info!(user = %user.id, "primary admin account created");
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::services::auth::{Argon2PasswordHasher, TokenService};

    use super::*;

    fn auth_over(store: &Store) -> AuthService {
        let tokens = TokenService::new(&SecretString::from(
            "kQ2m8fJx7ZpW4nR9vB1cT6yH3aD5gE0u".to_owned(),
        ));
        AuthService::new(store.clone(), tokens, Arc::new(Argon2PasswordHasher::new()))
    }

    #[test]
    fn primary_admin_is_created_once_with_the_admin_role() {
        let store = Store::new();
        let auth = auth_over(&store);

        let generated =
            ensure_primary_admin(&auth, &store, "admin@meridianvoyages.travel", None)
                .expect("bootstrap");
        assert!(generated.is_some());

        let admin = store
            .users()
            .find(|u| u.email.as_str() == "admin@meridianvoyages.travel")
            .expect("admin account");
        assert!(admin.is_admin());

        let again = ensure_primary_admin(&auth, &store, "admin@meridianvoyages.travel", None)
            .expect("bootstrap");
        assert!(again.is_none());
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn configured_bootstrap_password_is_used_verbatim() {
        let store = Store::new();
        let auth = auth_over(&store);
        let password = SecretString::from("fJ8kQ2mxZ7pW4nR9vB1cT6yH3".to_owned());

        let generated = ensure_primary_admin(
            &auth,
            &store,
            "admin@meridianvoyages.travel",
            Some(&password),
        )
        .expect("bootstrap");
        assert!(generated.is_none());

        let (_, token) = auth
            .login("admin@meridianvoyages.travel", password.expose_secret())
            .expect("login with configured password");
        assert!(!token.is_empty());
    }

    #[test]
    fn seeding_is_idempotent() {
        let store = Store::new();

        let first = seed_system_roles(&store);
        assert_eq!(first.len(), 4);
        assert_eq!(store.custom_roles().len(), 4);

        let second = seed_system_roles(&store);
        assert!(second.is_empty());
        assert_eq!(store.custom_roles().len(), 4);
    }

    #[test]
    fn admin_system_role_carries_every_permission() {
        let store = Store::new();
        seed_system_roles(&store);

        let admin = store
            .custom_roles()
            .find(|role| role.is_admin_role())
            .expect("admin role");
        assert_eq!(admin.permissions.len(), Permission::all().len());
    }
}
