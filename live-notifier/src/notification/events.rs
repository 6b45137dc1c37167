//! Go-live announcement and its Discord message payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Red accent used for live announcements.
pub const LIVE_COLOR: u32 = 0xe74c3c;

pub const THUMBNAIL_URL: &str = "https://www.youtube.com/img/desktop/yt_1200.png";

/// Message content; pings every member of the server.
pub const MENTION_EVERYONE: &str = "@everyone";

/// A stream that just went live and should be announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveNotification {
    /// Display name of the watched channel.
    pub channel_name: String,
    pub video_id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

impl LiveNotification {
    pub fn new(
        channel_name: impl Into<String>,
        video_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            video_id: video_id.into(),
            title: title.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn watch_url(&self) -> String {
        youtube_api::watch_url(&self.video_id)
    }

    pub fn headline(&self) -> String {
        format!("\u{1f534} {} is LIVE!", self.channel_name) // 🔴
    }

    pub fn embed(&self) -> Embed {
        let url = self.watch_url();
        Embed {
            title: self.headline(),
            description: format!("**{}**", self.title),
            fields: vec![EmbedField {
                name: "Watch Now".to_string(),
                value: format!("[Click here to watch the stream]({url})"),
                inline: false,
            }],
            url,
            color: LIVE_COLOR,
            timestamp: self.timestamp.to_rfc3339(),
            thumbnail: EmbedThumbnail {
                url: THUMBNAIL_URL.to_string(),
            },
        }
    }

    /// Body for both the webhook and the bot `create message` endpoint.
    pub fn message(&self) -> MessagePayload {
        MessagePayload {
            content: MENTION_EVERYONE.to_string(),
            embeds: vec![self.embed()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub timestamp: String,
    pub fields: Vec<EmbedField>,
    pub thumbnail: EmbedThumbnail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}
