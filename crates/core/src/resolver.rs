//! Pure permission resolution from role state.
//!
//! Resolution is a function of its inputs only: the user's built-in
//! roles, the custom roles the user is a member of, and any direct
//! grants. Nothing is persisted or cached - callers recompute from
//! current role state on every check.

use std::collections::BTreeSet;

use crate::permission::Permission;
use crate::role::{BuiltinRole, CustomRole};

/// The effective permission set for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPermissions {
    admin: bool,
    granted: BTreeSet<Permission>,
}

impl ResolvedPermissions {
    /// Whether the user holds the built-in admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.admin
    }

    /// Whether the user holds the given permission.
    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.admin || self.granted.contains(&permission)
    }

    /// Whether the user holds at least one of the given permissions.
    #[must_use]
    pub fn has_any(&self, permissions: &[Permission]) -> bool {
        self.admin || permissions.iter().any(|p| self.granted.contains(p))
    }

    /// Whether the user holds every one of the given permissions.
    #[must_use]
    pub fn has_all(&self, permissions: &[Permission]) -> bool {
        self.admin || permissions.iter().all(|p| self.granted.contains(p))
    }

    /// Iterates the explicitly granted permissions.
    ///
    /// For admins this is the explicit union, not the implicit
    /// everything - display code should check [`Self::is_admin`] first.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.granted.iter().copied()
    }
}

/// Resolves the effective permission set for a user.
///
/// The result is the union of the fixed table for each built-in role,
/// the permission sets of the custom roles the user belongs to, and any
/// directly granted permissions. The built-in admin role short-circuits
/// every query to `true`.
#[must_use]
pub fn resolve_permissions(
    builtin: &[BuiltinRole],
    custom: &[&CustomRole],
    direct: &[Permission],
) -> ResolvedPermissions {
    let admin = builtin.contains(&BuiltinRole::Admin);

    let mut granted = BTreeSet::new();
    for role in builtin {
        granted.extend(role.permissions().iter().copied());
    }
    for role in custom {
        granted.extend(role.permissions.iter().copied());
    }
    granted.extend(direct.iter().copied());

    ResolvedPermissions { admin, granted }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::types::CustomRoleId;

    use super::*;

    fn custom_role(name: &str, permissions: &[Permission]) -> CustomRole {
        CustomRole {
            id: CustomRoleId::generate(),
            name: name.to_owned(),
            description: String::new(),
            permissions: permissions.iter().copied().collect(),
            system: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_has_every_permission() {
        let resolved = resolve_permissions(&[BuiltinRole::Admin], &[], &[]);

        assert!(resolved.is_admin());
        for permission in Permission::all() {
            assert!(resolved.has(*permission));
        }
        assert!(resolved.has_all(Permission::all()));
    }

    #[test]
    fn non_admin_set_is_exactly_the_union() {
        let finance = custom_role("finance", &[Permission::CredentialManage]);
        let resolved = resolve_permissions(
            &[BuiltinRole::RelationshipManager],
            &[&finance],
            &[Permission::AiGenerate],
        );

        let expected: BTreeSet<Permission> = BuiltinRole::RelationshipManager
            .permissions()
            .iter()
            .copied()
            .chain([Permission::CredentialManage, Permission::AiGenerate])
            .collect();

        let actual: BTreeSet<Permission> = resolved.iter().collect();
        assert_eq!(actual, expected);

        // No more...
        assert!(!resolved.has(Permission::UserManage));
        assert!(!resolved.has(Permission::ItineraryManage));
        // ...and no less.
        assert!(resolved.has(Permission::DocumentVerify));
        assert!(resolved.has(Permission::CredentialManage));
        assert!(resolved.has(Permission::AiGenerate));
    }

    #[test]
    fn has_any_and_has_all_respect_the_union() {
        let resolved = resolve_permissions(&[BuiltinRole::Agent], &[], &[]);

        assert!(resolved.has_any(&[Permission::RoleManage, Permission::BookingView]));
        assert!(!resolved.has_any(&[Permission::RoleManage, Permission::UserManage]));
        assert!(resolved.has_all(&[Permission::ItineraryView, Permission::BookingManage]));
        assert!(!resolved.has_all(&[Permission::ItineraryView, Permission::RoleManage]));
    }

    #[test]
    fn membership_in_multiple_custom_roles_unions() {
        let a = custom_role("uploads", &[Permission::DocumentVerify]);
        let b = custom_role("comms", &[Permission::MessageBroadcast]);
        let resolved = resolve_permissions(&[BuiltinRole::Customer], &[&a, &b], &[]);

        assert!(resolved.has(Permission::DocumentVerify));
        assert!(resolved.has(Permission::MessageBroadcast));
        assert!(resolved.has(Permission::ItineraryView));
        assert!(!resolved.is_admin());
    }
}
