//! Wire models for the `search.list` endpoint.
//!
//! Only the fields needed for live lookups are modeled; everything else in the
//! response is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::error::YoutubeError;

/// Base URL for watch links.
pub const WATCH_URL: &str = "https://www.youtube.com/watch";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Absent entirely when nothing matches the filters.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: ResourceId,
    #[serde(default)]
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub live_broadcast_content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Error envelope returned by Google APIs on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A broadcast that is currently live on the searched channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveVideo {
    pub video_id: String,
    pub title: String,
    pub channel_title: Option<String>,
}

impl LiveVideo {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            channel_title: None,
        }
    }

    pub fn watch_url(&self) -> String {
        watch_url(&self.video_id)
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}?v={video_id}")
}

impl SearchResponse {
    /// The first live result, if any. Later items are ignored.
    pub fn first_live_video(&self) -> Result<Option<LiveVideo>, YoutubeError> {
        let Some(item) = self.items.first() else {
            return Ok(None);
        };

        let video_id = item
            .id
            .video_id
            .clone()
            .ok_or(YoutubeError::MissingField("id.videoId"))?;
        let snippet = item
            .snippet
            .as_ref()
            .ok_or(YoutubeError::MissingField("snippet"))?;
        let title = snippet
            .title
            .clone()
            .ok_or(YoutubeError::MissingField("snippet.title"))?;

        Ok(Some(LiveVideo {
            video_id,
            title,
            channel_title: snippet.channel_title.clone(),
        }))
    }
}
