pub mod whatsapp;

use async_trait::async_trait;

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> anyhow::Result<()>;
}
