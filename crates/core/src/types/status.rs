//! Status enums for bookings, payments, and uploaded files.

use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// Booking payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
    Refunded,
}

/// Where a customer sits in the sales pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerBookingState {
    #[default]
    Prospect,
    Quoted,
    Booked,
    Travelled,
    Dormant,
}

/// Verification state of an uploaded customer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// Approval state of itinerary collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_use_snake_case_wire_values() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PartiallyPaid).expect("serialize"),
            "\"partially_paid\""
        );
        assert_eq!(
            serde_json::to_string(&CustomerBookingState::Prospect).expect("serialize"),
            "\"prospect\""
        );
    }

    #[test]
    fn statuses_default_to_initial_state() {
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
        assert_eq!(VerificationStatus::default(), VerificationStatus::Pending);
        assert_eq!(ApprovalStatus::default(), ApprovalStatus::Pending);
    }
}
