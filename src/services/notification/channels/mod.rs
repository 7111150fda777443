//! Notification Channel Trait
//!
//! Every alert channel formats and delivers an [`AlertMessage`] on its own;
//! the dispatcher owns timeouts and retries.

pub mod email;
pub mod in_system;
pub mod whatsapp;

use async_trait::async_trait;

use super::types::{AlertMessage, NotificationChannelType, NotificationError};
use crate::models::reservation::TenantContacts;

pub use email::EmailChannel;
pub use in_system::InSystemChannel;
pub use whatsapp::WhatsAppChannel;

/// Async trait for alert channel implementations.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Channel type identifier.
    fn channel_type(&self) -> NotificationChannelType;

    /// Recipient for this tenant, or `None` when the channel is not configured
    /// (missing global endpoint or missing tenant contact).
    fn recipient(&self, contacts: &TenantContacts) -> Option<String>;

    /// Deliver one alert to `recipient`.
    async fn send(&self, message: &AlertMessage, recipient: &str) -> Result<(), NotificationError>;
}

/// Turn a non-2xx response into [`NotificationError::Rejected`].
pub(crate) async fn check_response(response: reqwest::Response) -> Result<(), NotificationError> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(NotificationError::Rejected { status, body })
}
