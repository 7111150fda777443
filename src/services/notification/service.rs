//! Notification Dispatcher
//!
//! Fans an urgent alert out to every configured channel in parallel. Each
//! channel has its own timeout and retry budget, and one channel failing never
//! affects another or the caller.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use smart_tagging_core::AnalysisResult;
use smart_tagging_llm::build_http_client;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::channels::{EmailChannel, InSystemChannel, NotificationChannel, WhatsAppChannel};
use super::types::*;
use crate::models::reservation::TenantContacts;
use crate::models::settings::NotificationSettings;

/// Per-channel delivery budget
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            attempt_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_millis(200),
        }
    }
}

impl From<&NotificationSettings> for DeliveryPolicy {
    fn from(settings: &NotificationSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            attempt_timeout: Duration::from_secs(settings.timeout_secs),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }
}

/// Outcome of one dispatch call
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Urgency was detected and dispatch attempted; says nothing about delivery
    pub triggered: bool,
    pub attempts: Vec<NotificationAttempt>,
}

impl DispatchReport {
    pub fn delivered_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.status == DeliveryStatus::Sent)
            .count()
    }
}

/// Central alert dispatcher.
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    policy: DeliveryPolicy,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>, policy: DeliveryPolicy) -> Self {
        Self { channels, policy }
    }

    /// In-system, WhatsApp and email channels from settings.
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        let policy = DeliveryPolicy::from(settings);
        let client = build_http_client(Some(policy.attempt_timeout));

        let channels: Vec<Arc<dyn NotificationChannel>> = vec![
            Arc::new(InSystemChannel::new()),
            Arc::new(WhatsAppChannel::new(
                client.clone(),
                settings.whatsapp_api_url.clone(),
                settings.whatsapp_api_token.clone(),
            )),
            Arc::new(EmailChannel::new(
                client,
                settings.email_api_url.clone(),
                settings.email_api_token.clone(),
                settings.email_from.clone(),
            )),
        ];

        Self::new(channels, policy)
    }

    pub fn channel_types(&self) -> Vec<NotificationChannelType> {
        self.channels.iter().map(|c| c.channel_type()).collect()
    }

    /// Alert staff when `result` is urgent.
    ///
    /// Non-urgent results are a no-op with `triggered == false`. Channels
    /// without configuration for this tenant are skipped.
    pub async fn dispatch(
        &self,
        tenant_id: Uuid,
        reservation_id: Uuid,
        result: &AnalysisResult,
        contacts: &TenantContacts,
    ) -> DispatchReport {
        if !result.is_urgent() {
            return DispatchReport::default();
        }

        let message = AlertMessage::urgent(tenant_id, reservation_id, result);

        let deliveries = self.channels.iter().filter_map(|channel| {
            match channel.recipient(contacts) {
                Some(recipient) => Some(self.deliver(channel.as_ref(), &message, recipient)),
                None => {
                    debug!(
                        tenant_id = %tenant_id,
                        channel = %channel.channel_type(),
                        "Channel not configured, skipping"
                    );
                    None
                }
            }
        });

        let attempts = join_all(deliveries).await;

        for attempt in &attempts {
            match attempt.status {
                DeliveryStatus::Sent => info!(
                    tenant_id = %tenant_id,
                    reservation_id = %reservation_id,
                    channel = %attempt.channel,
                    attempts = attempt.attempts,
                    "Urgent alert sent"
                ),
                DeliveryStatus::Failed => warn!(
                    tenant_id = %tenant_id,
                    reservation_id = %reservation_id,
                    channel = %attempt.channel,
                    attempts = attempt.attempts,
                    reason = attempt.reason.as_deref().unwrap_or_default(),
                    "Urgent alert delivery failed"
                ),
            }
        }

        let report = DispatchReport {
            triggered: true,
            attempts,
        };
        info!(
            tenant_id = %tenant_id,
            reservation_id = %reservation_id,
            channels = report.attempts.len(),
            delivered = report.delivered_count(),
            "Urgent notification dispatched"
        );
        report
    }

    /// One channel, bounded by the delivery policy.
    async fn deliver(
        &self,
        channel: &dyn NotificationChannel,
        message: &AlertMessage,
        recipient: String,
    ) -> NotificationAttempt {
        let max_attempts = self.policy.max_retries.saturating_add(1);
        let timeout_ms = self.policy.attempt_timeout.as_millis() as u64;
        let mut attempt = 1;

        loop {
            let outcome =
                tokio::time::timeout(self.policy.attempt_timeout, channel.send(message, &recipient))
                    .await
                    .unwrap_or(Err(NotificationError::Timeout(timeout_ms)));

            match outcome {
                Ok(()) => {
                    return NotificationAttempt {
                        channel: channel.channel_type(),
                        status: DeliveryStatus::Sent,
                        attempts: attempt,
                        reason: None,
                    };
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    debug!(
                        channel = %channel.channel_type(),
                        attempt,
                        error = %e,
                        "Alert delivery failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(e) => {
                    return NotificationAttempt {
                        channel: channel.channel_type(),
                        status: DeliveryStatus::Failed,
                        attempts: attempt,
                        reason: Some(e.to_string()),
                    };
                }
            }
        }
    }
}
