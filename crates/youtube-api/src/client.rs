use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::YoutubeError;
use crate::models::{ApiErrorResponse, LiveVideo, SearchResponse};

/// Client for the live subset of the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl YoutubeClient {
    pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    const SEARCH_PATH: &str = "youtube/v3/search";

    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            // constant is a valid absolute url
            base_url: Url::parse(Self::DEFAULT_BASE_URL).expect("default base url"),
            api_key: api_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at another host, e.g. a local API mock.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, YoutubeError> {
        let mut url =
            Url::parse(base_url).map_err(|e| YoutubeError::InvalidUrl(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(YoutubeError::InvalidUrl(base_url.to_string()));
        }
        // join() replaces the last segment unless the path ends with a slash
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn search_url(&self) -> Result<Url, YoutubeError> {
        self.base_url
            .join(Self::SEARCH_PATH)
            .map_err(|e| YoutubeError::InvalidUrl(e.to_string()))
    }

    /// Run `search.list` for live videos on `channel_id`.
    pub async fn search_live(&self, channel_id: &str) -> Result<SearchResponse, YoutubeError> {
        let url = self.search_url()?;
        debug!("Searching live videos for channel {}", channel_id);

        let response = self
            .client
            .get(url)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("eventType", "live"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(YoutubeError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        debug!("search returned {} item(s)", parsed.items.len());
        Ok(parsed)
    }

    /// The first live video on `channel_id`, or `None` when the channel is offline.
    pub async fn current_live_video(
        &self,
        channel_id: &str,
    ) -> Result<Option<LiveVideo>, YoutubeError> {
        self.search_live(channel_id).await?.first_live_video()
    }
}
