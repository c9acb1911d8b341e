//! User account documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_core::{BuiltinRole, CustomRoleId, Email, Permission, UserId};

/// A user account in the `users` collection.
///
/// Carries the argon2 password hash; API responses go through
/// [`UserView`], which never includes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID.
    pub id: UserId,
    /// Sign-in email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Contact numbers in E.164 form.
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    /// Built-in roles held by this user.
    #[serde(default)]
    pub roles: Vec<BuiltinRole>,
    /// Custom roles this user is a member of.
    #[serde(default)]
    pub custom_role_ids: Vec<CustomRoleId>,
    /// Permissions granted directly, outside any role.
    #[serde(default)]
    pub direct_permissions: Vec<Permission>,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the built-in admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&BuiltinRole::Admin)
    }
}

/// API-facing projection of a [`User`] without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone_numbers: Vec<String>,
    pub roles: Vec<BuiltinRole>,
    pub custom_role_ids: Vec<CustomRoleId>,
    pub direct_permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            phone_numbers: user.phone_numbers.clone(),
            roles: user.roles.clone(),
            custom_role_ids: user.custom_role_ids.clone(),
            direct_permissions: user.direct_permissions.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
