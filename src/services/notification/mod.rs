//! Notification Services
//!
//! Urgent-alert fan-out to staff: an always-on in-system log channel plus
//! optional WhatsApp and email channels.

pub mod channels;
pub mod service;
pub mod types;

pub use channels::NotificationChannel;
pub use service::{DeliveryPolicy, DispatchReport, NotificationDispatcher};
pub use types::*;
