use thiserror::Error;

#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("api returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("missing field in search result: {0}")]
    MissingField(&'static str),
}

impl YoutubeError {
    /// Whether this error came from the transport layer (connect, timeout, body read).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpError(_))
    }
}
