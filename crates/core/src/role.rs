//! Built-in roles and admin-defined custom roles.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::types::CustomRoleId;

/// The fixed roles every deployment ships with.
///
/// Each built-in role carries a fixed permission table; the `Admin` role
/// short-circuits permission checks entirely (see
/// [`crate::resolver::ResolvedPermissions`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRole {
    Admin,
    Agent,
    RelationshipManager,
    Customer,
}

impl BuiltinRole {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agent => "agent",
            Self::RelationshipManager => "relationship_manager",
            Self::Customer => "customer",
        }
    }

    /// Returns the fixed permission table for this role.
    ///
    /// The admin table lists every permission for completeness, but admin
    /// checks never consult it - resolution short-circuits on the role.
    #[must_use]
    pub const fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::Admin => Permission::all(),
            Self::Agent => &[
                Permission::ItineraryView,
                Permission::ItineraryManage,
                Permission::CustomerView,
                Permission::CustomerManage,
                Permission::BookingView,
                Permission::BookingManage,
                Permission::AiGenerate,
            ],
            Self::RelationshipManager => &[
                Permission::CustomerView,
                Permission::BookingView,
                Permission::DocumentVerify,
                Permission::MessageBroadcast,
            ],
            Self::Customer => &[Permission::ItineraryView],
        }
    }

    /// Returns all built-in roles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        const ALL: &[BuiltinRole] = &[
            BuiltinRole::Admin,
            BuiltinRole::Agent,
            BuiltinRole::RelationshipManager,
            BuiltinRole::Customer,
        ];

        ALL
    }
}

/// Error returned when parsing an unknown role value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role value '{0}'")]
pub struct RoleParseError(pub String);

impl FromStr for BuiltinRole {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|role| role.as_str() == value)
            .copied()
            .ok_or_else(|| RoleParseError(value.to_owned()))
    }
}

/// An admin-defined named permission set, stored in the `custom_roles`
/// collection and assignable to users in addition to built-in roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRole {
    /// Document ID.
    pub id: CustomRoleId,
    /// Unique role name shown in the UI.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Permissions granted to members of this role.
    pub permissions: BTreeSet<Permission>,
    /// Seeded system roles cannot be renamed; the `admin` system role is
    /// fully immutable.
    pub system: bool,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CustomRole {
    /// Name of the seeded system role that mirrors the built-in admin.
    pub const ADMIN_NAME: &'static str = "admin";

    /// Whether this is the fully immutable admin system role.
    #[must_use]
    pub fn is_admin_role(&self) -> bool {
        self.system && self.name == Self::ADMIN_NAME
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn builtin_role_roundtrip_storage_value() {
        for role in BuiltinRole::all() {
            assert_eq!(BuiltinRole::from_str(role.as_str()).ok(), Some(*role));
        }
    }

    #[test]
    fn agent_table_does_not_grant_admin_concerns() {
        let agent = BuiltinRole::Agent.permissions();
        assert!(agent.contains(&Permission::ItineraryManage));
        assert!(!agent.contains(&Permission::RoleManage));
        assert!(!agent.contains(&Permission::CredentialManage));
    }

    #[test]
    fn admin_system_role_is_recognized() {
        let role = CustomRole {
            id: CustomRoleId::generate(),
            name: CustomRole::ADMIN_NAME.to_owned(),
            description: String::new(),
            permissions: BTreeSet::new(),
            system: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(role.is_admin_role());

        let custom = CustomRole {
            name: "finance".to_owned(),
            system: false,
            ..role
        };
        assert!(!custom.is_admin_role());
    }
}
