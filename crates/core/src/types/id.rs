//! Newtype IDs for type-safe document references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different document collections. IDs are
//! UUID-backed strings, matching the document-store convention of opaque
//! string document keys.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `generate()` for a fresh UUID-backed ID
/// - `as_str()` and `From` conversions for storage keys
///
/// # Example
///
/// ```rust
/// # use meridian_core::define_id;
/// define_id!(UserId);
/// define_id!(BookingId);
///
/// let user_id = UserId::generate();
/// let booking_id = BookingId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: UserId = booking_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4().to_string())
            }

            /// Wrap an existing storage key.
            #[must_use]
            pub const fn new(id: String) -> Self {
                Self(id)
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard document IDs
define_id!(UserId);
define_id!(CustomRoleId);
define_id!(ItineraryId);
define_id!(CustomerId);
define_id!(BookingId);
define_id!(CollateralId);
define_id!(CustomerDocumentId);
define_id!(FileId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = UserId::generate();
        let b = UserId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn id_roundtrips_through_string() {
        let id = BookingId::from("booking-123");
        assert_eq!(id.as_str(), "booking-123");
        assert_eq!(String::from(id), "booking-123");
    }

    #[test]
    fn id_serializes_transparently() {
        let id = UserId::from("abc");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc\"");

        let back: UserId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
