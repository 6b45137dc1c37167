//! Discord webhook channel.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{NotificationChannel, truncate_body};
use crate::Result;
use crate::notification::events::LiveNotification;
use crate::utils::http_client;

const MAX_LOGGED_BODY: usize = 512;

/// Webhook channel configuration.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Pre-provisioned webhook URL. Holds the webhook secret.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: http_client::REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Posts announcements to a Discord webhook.
pub struct WebhookChannel {
    config: WebhookConfig,
    client: Client,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig) -> Self {
        let client = http_client::build_client(Duration::from_secs(config.timeout_secs));
        Self { config, client }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn channel_type(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, notification: &LiveNotification) -> Result<()> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&notification.message())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::Delivery {
                channel: self.channel_type(),
                status: status.as_u16(),
                body: truncate_body(&body, MAX_LOGGED_BODY),
            });
        }

        debug!("Webhook notification sent for {}", notification.video_id);
        Ok(())
    }
}
