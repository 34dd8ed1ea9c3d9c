use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::MessageSender;

/// Outbound text messages via the WhatsApp Business Cloud API.
pub struct WhatsAppSender {
    api_base: String,
    access_token: String,
    phone_number_id: String,
    client: reqwest::Client,
}

impl WhatsAppSender {
    pub fn new(api_base: String, access_token: String, phone_number_id: String) -> Self {
        Self {
            api_base,
            access_token,
            phone_number_id,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    async fn send_text(&self, to: &str, body: &str) -> anyhow::Result<()> {
        if self.access_token.is_empty() || self.phone_number_id.is_empty() {
            // Unconfigured credentials: log and drop, never error the webhook.
            tracing::warn!("WhatsApp credentials not configured, dropping outbound message");
            return Ok(());
        }

        let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);

        self.client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "text",
                "text": { "body": body },
            }))
            .send()
            .await
            .context("failed to send WhatsApp message")?
            .error_for_status()
            .context("WhatsApp API returned error")?;

        Ok(())
    }
}
