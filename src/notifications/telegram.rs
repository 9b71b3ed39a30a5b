use async_trait::async_trait;
use serde_json::json;

use crate::config::TelegramConfig;
use crate::notifications::ChatClient;

/// Delivers messages to a fixed chat through the Telegram bot API.
pub struct TelegramClient {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramClient {
    pub fn new(cfg: &TelegramConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token: cfg.bot_token.clone(),
            chat_id: cfg.chat_id.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn send_message(&self, text: &str) -> anyhow::Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("telegram API returned {status}: {body}");
        }
        Ok(())
    }
}
