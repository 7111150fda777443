//! In-System Alert Channel
//!
//! Records the alert in the structured log. Always configured.

use async_trait::async_trait;

use super::NotificationChannel;
use crate::models::reservation::TenantContacts;
use crate::services::notification::types::*;

#[derive(Debug, Default)]
pub struct InSystemChannel;

impl InSystemChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for InSystemChannel {
    fn channel_type(&self) -> NotificationChannelType {
        NotificationChannelType::InSystem
    }

    fn recipient(&self, _contacts: &TenantContacts) -> Option<String> {
        Some("event-log".to_string())
    }

    async fn send(&self, message: &AlertMessage, _recipient: &str) -> Result<(), NotificationError> {
        tracing::info!(
            tenant_id = %message.tenant_id,
            reservation_id = %message.reservation_id,
            "[IN-SYSTEM] {}",
            message.subject
        );
        Ok(())
    }
}
