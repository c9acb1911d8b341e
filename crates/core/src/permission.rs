//! The permission vocabulary enforced by back-office policy checks.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permissions enforced by the back-office API.
///
/// The serialized form is the stable dotted storage value used in role
/// documents and in API payloads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Permission {
    /// Allows reading itineraries.
    #[serde(rename = "itinerary.view")]
    ItineraryView,
    /// Allows creating, editing, and deleting itineraries.
    #[serde(rename = "itinerary.manage")]
    ItineraryManage,
    /// Allows reading customers.
    #[serde(rename = "customer.view")]
    CustomerView,
    /// Allows creating, editing, and deleting customers.
    #[serde(rename = "customer.manage")]
    CustomerManage,
    /// Allows reading bookings.
    #[serde(rename = "booking.view")]
    BookingView,
    /// Allows creating, editing, and deleting bookings.
    #[serde(rename = "booking.manage")]
    BookingManage,
    /// Allows reading user accounts.
    #[serde(rename = "user.view")]
    UserView,
    /// Allows creating, editing, and deleting user accounts.
    #[serde(rename = "user.manage")]
    UserManage,
    /// Allows managing custom roles and role assignments.
    #[serde(rename = "role.manage")]
    RoleManage,
    /// Allows verifying or rejecting uploaded customer documents.
    #[serde(rename = "document.verify")]
    DocumentVerify,
    /// Allows calling the AI generation endpoints.
    #[serde(rename = "ai.generate")]
    AiGenerate,
    /// Allows sending WhatsApp broadcasts.
    #[serde(rename = "message.broadcast")]
    MessageBroadcast,
    /// Allows reading and rotating provider API credentials.
    #[serde(rename = "credential.manage")]
    CredentialManage,
}

impl Permission {
    /// Returns the stable storage value for this permission.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ItineraryView => "itinerary.view",
            Self::ItineraryManage => "itinerary.manage",
            Self::CustomerView => "customer.view",
            Self::CustomerManage => "customer.manage",
            Self::BookingView => "booking.view",
            Self::BookingManage => "booking.manage",
            Self::UserView => "user.view",
            Self::UserManage => "user.manage",
            Self::RoleManage => "role.manage",
            Self::DocumentVerify => "document.verify",
            Self::AiGenerate => "ai.generate",
            Self::MessageBroadcast => "message.broadcast",
            Self::CredentialManage => "credential.manage",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::ItineraryView,
            Permission::ItineraryManage,
            Permission::CustomerView,
            Permission::CustomerManage,
            Permission::BookingView,
            Permission::BookingManage,
            Permission::UserView,
            Permission::UserManage,
            Permission::RoleManage,
            Permission::DocumentVerify,
            Permission::AiGenerate,
            Permission::MessageBroadcast,
            Permission::CredentialManage,
        ];

        ALL
    }
}

/// Error returned when parsing an unknown permission value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown permission value '{0}'")]
pub struct PermissionParseError(pub String);

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|permission| permission.as_str() == value)
            .copied()
            .ok_or_else(|| PermissionParseError(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Permission;

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert_eq!(restored.ok(), Some(*permission));
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("itinerary.unknown").is_err());
    }

    #[test]
    fn serde_matches_storage_value() {
        let json = serde_json::to_string(&Permission::MessageBroadcast).expect("serialize");
        assert_eq!(json, "\"message.broadcast\"");

        let back: Permission = serde_json::from_str("\"credential.manage\"").expect("deserialize");
        assert_eq!(back, Permission::CredentialManage);
    }
}
