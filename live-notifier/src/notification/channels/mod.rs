//! Delivery channels for live announcements.
//!
//! - Discord webhooks (one unauthenticated POST per announcement)
//! - Discord bot (authenticated REST call while a gateway session keeps the bot online)

mod bot;
mod webhook;

pub use bot::{BotChannel, BotConfig};
pub use webhook::{WebhookChannel, WebhookConfig};

use async_trait::async_trait;

use super::events::LiveNotification;
use crate::Result;

/// Something that can deliver a [`LiveNotification`].
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Deliver one announcement. No retries; a failure is final.
    async fn send(&self, notification: &LiveNotification) -> Result<()>;
}

/// Which transport to announce through.
#[derive(Debug, Clone)]
pub enum ChannelConfig {
    Webhook(WebhookConfig),
    Bot(BotConfig),
}

impl ChannelConfig {
    pub fn channel_type(&self) -> &'static str {
        match self {
            Self::Webhook(_) => "webhook",
            Self::Bot(_) => "bot",
        }
    }
}

/// Cut a response body down to something reasonable for a log line.
pub(crate) fn truncate_body(body: &str, limit: usize) -> String {
    if body.chars().count() <= limit {
        return body.to_string();
    }
    let truncated: String = body.chars().take(limit).collect();
    format!("{truncated}...")
}
