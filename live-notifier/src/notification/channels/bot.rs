//! Discord bot channel.
//!
//! Messages go through the REST `create message` endpoint authenticated with
//! the bot token. Keeping the bot online is the gateway session's job; this
//! channel only posts.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;

use super::{NotificationChannel, truncate_body};
use crate::Result;
use crate::gateway::Readiness;
use crate::notification::events::LiveNotification;
use crate::utils::http_client;

const MAX_LOGGED_BODY: usize = 512;

/// Bot channel configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token, sent as `Authorization: Bot <token>`.
    pub token: String,
    /// Destination text channel.
    pub channel_id: u64,
    /// REST API base, without trailing slash.
    pub api_base: String,
    pub gateway_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BotConfig {
    pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
    pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

    pub fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    pub fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: 0,
            api_base: Self::DEFAULT_API_BASE.to_string(),
            gateway_url: Self::DEFAULT_GATEWAY_URL.to_string(),
            timeout_secs: http_client::REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .field("gateway_url", &self.gateway_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Posts announcements as the bot user.
pub struct BotChannel {
    config: BotConfig,
    client: Client,
    readiness: Option<Readiness>,
}

impl BotChannel {
    pub fn new(config: BotConfig) -> Self {
        let client = http_client::build_client(Duration::from_secs(config.timeout_secs));
        Self {
            config,
            client,
            readiness: None,
        }
    }

    /// Only post while the gateway session reports ready.
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = Some(readiness);
        self
    }

    fn session_ready(&self) -> bool {
        self.readiness
            .as_ref()
            .is_none_or(|ready| ready.borrow().is_some())
    }
}

#[async_trait]
impl NotificationChannel for BotChannel {
    fn channel_type(&self) -> &'static str {
        "bot"
    }

    async fn send(&self, notification: &LiveNotification) -> Result<()> {
        if !self.session_ready() {
            return Err(crate::Error::gateway("session not ready"));
        }

        let response = self
            .client
            .post(self.config.messages_url())
            .header(header::AUTHORIZATION, self.config.authorization())
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

        debug!(
            "Bot notification sent to channel {} for {}",
            self.config.channel_id, notification.video_id
        );
        Ok(())
    }
}
