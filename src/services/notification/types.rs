//! Notification Core Types
//!
//! Channel identifiers, the alert message, per-channel attempt records and
//! errors.

use serde::{Deserialize, Serialize};
use smart_tagging_core::{AnalysisResult, GENERIC_URGENT_REASON};
use std::fmt;
use uuid::Uuid;

/// Supported alert channel types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannelType {
    /// In-system event log; always attempted
    InSystem,
    WhatsApp,
    Email,
}

impl fmt::Display for NotificationChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSystem => write!(f, "in_system"),
            Self::WhatsApp => write!(f, "whatsapp"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// Delivery outcome of one channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Record of one channel dispatch. Logged, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAttempt {
    pub channel: NotificationChannelType,
    pub status: DeliveryStatus,
    /// Tries made, including retries
    pub attempts: u32,
    /// Last error for failed deliveries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Urgent alert sent to staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    pub tenant_id: Uuid,
    pub reservation_id: Uuid,
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Build the staff alert for an urgent analysis.
    pub fn urgent(tenant_id: Uuid, reservation_id: Uuid, result: &AnalysisResult) -> Self {
        let subject = format!(
            "URGENT: Allergy/Medical Alert - Reservation {}",
            reservation_id
        );
        let tags = if result.tags.is_empty() {
            "(none)".to_string()
        } else {
            result.tag_list()
        };
        let body = format!(
            "Reservation {} has been flagged as URGENT.\n\n\
             Reason: {}\n\
             Tags: {}\n\
             AI Summary: {}\n\
             Confidence: {}%\n\n\
             Please review this reservation immediately and brief kitchen staff.",
            reservation_id,
            result.urgent_reason.as_deref().unwrap_or(GENERIC_URGENT_REASON),
            tags,
            result.summary,
            (result.confidence * 100.0).round() as u32,
        );

        Self {
            tenant_id,
            reservation_id,
            subject,
            body,
        }
    }

    /// Subject and body as one plain-text message.
    pub fn as_text(&self) -> String {
        format!("{}\n\n{}", self.subject, self.body)
    }
}

/// Notification-specific errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Channel rejected alert with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl NotificationError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, timeouts, 429 and 5xx are retried. Auth failures,
    /// other 4xx rejections and misconfiguration are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidConfig(_) => false,
        }
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}
