//! Email Alert Channel
//!
//! Sends through a transactional email HTTP API:
//!
//! ```json
//! {"from": "...", "to": ["..."], "subject": "...", "text": "..."}
//! ```

use async_trait::async_trait;

use super::{check_response, NotificationChannel};
use crate::models::reservation::TenantContacts;
use crate::services::notification::types::*;

pub struct EmailChannel {
    client: reqwest::Client,
    api_url: Option<String>,
    api_token: Option<String>,
    from: String,
}

impl EmailChannel {
    pub fn new(
        client: reqwest::Client,
        api_url: Option<String>,
        api_token: Option<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.filter(|u| !u.trim().is_empty()),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            from: from.into(),
        }
    }

    /// Build the JSON payload for the email API.
    pub fn build_payload(&self, message: &AlertMessage, to: &str) -> serde_json::Value {
        serde_json::json!({
            "from": self.from,
            "to": [to],
            "subject": message.subject,
            "text": message.body,
        })
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn channel_type(&self) -> NotificationChannelType {
        NotificationChannelType::Email
    }

    fn recipient(&self, contacts: &TenantContacts) -> Option<String> {
        if self.api_url.is_none() {
            return None;
        }
        contacts.staff_email().map(str::to_string)
    }

    async fn send(&self, message: &AlertMessage, recipient: &str) -> Result<(), NotificationError> {
        let url = self
            .api_url
            .as_deref()
            .ok_or_else(|| NotificationError::InvalidConfig("Email API URL not set".into()))?;

        let mut request = self
            .client
            .post(url)
            .json(&self.build_payload(message, recipient));

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        check_response(request.send().await?).await
    }
}
