//! Live status lookups for the watched channel.

use tracing::{debug, warn};
use youtube_api::{LiveVideo, YoutubeClient};

use super::state::{LiveCheck, MonitorState};
use crate::Result;

/// Checks whether the watched channel is live and folds the answer into
/// [`MonitorState`].
#[derive(Debug, Clone)]
pub struct LiveStatusChecker {
    client: YoutubeClient,
    channel_id: String,
}

impl LiveStatusChecker {
    pub fn new(client: YoutubeClient, channel_id: impl Into<String>) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// One search request. Only the first live result is considered.
    pub async fn fetch(&self) -> Result<Option<LiveVideo>> {
        Ok(self.client.current_live_video(&self.channel_id).await?)
    }

    /// Poll once and return the next state.
    ///
    /// Errors never escape: a failed poll is logged and reported as
    /// [`LiveCheck::NotLive`] with the state unchanged.
    pub async fn check(&self, state: MonitorState) -> (MonitorState, LiveCheck) {
        let result = self.fetch().await;

        if let Err(e) = &result {
            warn!(
                channel_id = %self.channel_id,
                error = %e,
                "Error checking YouTube live status"
            );
        }

        let (next, check) = state.apply(&result);
        match &check {
            LiveCheck::NewlyLive { video_id, title } => {
                debug!("Channel {} went live: {} ({})", self.channel_id, title, video_id)
            }
            LiveCheck::StillLive { video_id, .. } => {
                debug!("Channel {} still live ({})", self.channel_id, video_id)
            }
            LiveCheck::NotLive => debug!("Channel {} is not live", self.channel_id),
        }

        (next, check)
    }
}
