//! WhatsApp integration via the Meta Graph API.
//!
//! This module provides:
//! - [`WhatsAppClient`] for sending template-free text messages
//! - Broadcast fan-out with per-recipient outcomes

mod client;
mod error;
mod types;

pub use client::WhatsAppClient;
pub use error::WhatsAppError;
pub use types::{BroadcastOutcome, BroadcastSummary, SendMessageResponse};
