//! Customer documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_core::{CustomerBookingState, CustomerDocumentId, CustomerId, Email, UserId, VerificationStatus};

/// A customer in the `customers` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Document ID.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Contact number in E.164 form.
    #[serde(default)]
    pub phone: Option<String>,
    /// The agent who registered this customer.
    pub registered_by: UserId,
    /// Optional relationship manager assignment.
    #[serde(default)]
    pub relationship_manager_id: Option<UserId>,
    /// Pipeline position.
    #[serde(default)]
    pub booking_state: CustomerBookingState,
    /// Uploaded identity/visa documents.
    #[serde(default)]
    pub documents: Vec<CustomerDocument>,
    /// When the customer was registered.
    pub created_at: DateTime<Utc>,
    /// When the customer was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An uploaded customer document awaiting verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDocument {
    /// Document file ID.
    pub id: CustomerDocumentId,
    /// Original file name.
    pub file_name: String,
    /// MIME type as uploaded.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Download URL.
    pub url: String,
    /// Verification state.
    pub status: VerificationStatus,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}
