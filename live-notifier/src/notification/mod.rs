//! Live announcements.
//!
//! [`LiveNotification`] carries what to say; a [`NotificationChannel`]
//! decides how it reaches Discord. Failed deliveries are dropped: no retry,
//! no queue.

pub mod channels;
pub mod events;

pub use channels::{
    BotChannel, BotConfig, ChannelConfig, NotificationChannel, WebhookChannel, WebhookConfig,
};
pub use events::{Embed, LiveNotification, MessagePayload};

/// Build the channel selected by configuration.
pub fn build_channel(config: &ChannelConfig) -> Box<dyn NotificationChannel> {
    match config {
        ChannelConfig::Webhook(c) => Box::new(WebhookChannel::new(c.clone())),
        ChannelConfig::Bot(c) => Box::new(BotChannel::new(c.clone())),
    }
}
