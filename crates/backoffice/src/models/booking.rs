//! Booking documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_core::{BookingId, BookingStatus, CustomerId, ItineraryId, PaymentStatus};

/// A booking linking a customer to an itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Document ID.
    pub id: BookingId,
    /// The customer who booked.
    pub customer_id: CustomerId,
    /// The itinerary booked.
    pub itinerary_id: ItineraryId,
    /// Lifecycle status.
    #[serde(default)]
    pub status: BookingStatus,
    /// Payment status.
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
}
