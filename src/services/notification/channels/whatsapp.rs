//! WhatsApp Alert Channel
//!
//! Posts a text message to a WhatsApp Business-style messaging API:
//!
//! ```json
//! {"messaging_product": "whatsapp", "to": "<phone>", "type": "text", "text": {"body": "..."}}
//! ```

use async_trait::async_trait;

use super::{check_response, NotificationChannel};
use crate::models::reservation::TenantContacts;
use crate::services::notification::types::*;

pub struct WhatsAppChannel {
    client: reqwest::Client,
    api_url: Option<String>,
    api_token: Option<String>,
}

impl WhatsAppChannel {
    pub fn new(client: reqwest::Client, api_url: Option<String>, api_token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.filter(|u| !u.trim().is_empty()),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Build the JSON payload for the messaging API.
    pub fn build_payload(message: &AlertMessage, phone: &str) -> serde_json::Value {
        serde_json::json!({
            "messaging_product": "whatsapp",
            "to": phone,
            "type": "text",
            "text": {
                "body": message.as_text(),
            },
        })
    }
}

#[async_trait]
impl NotificationChannel for WhatsAppChannel {
    fn channel_type(&self) -> NotificationChannelType {
        NotificationChannelType::WhatsApp
    }

    fn recipient(&self, contacts: &TenantContacts) -> Option<String> {
        if self.api_url.is_none() {
            return None;
        }
        contacts.staff_phone().map(str::to_string)
    }

    async fn send(&self, message: &AlertMessage, recipient: &str) -> Result<(), NotificationError> {
        let url = self
            .api_url
            .as_deref()
            .ok_or_else(|| NotificationError::InvalidConfig("WhatsApp API URL not set".into()))?;

        let mut request = self
            .client
            .post(url)
            .json(&Self::build_payload(message, recipient));

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        check_response(request.send().await?).await
    }
}
