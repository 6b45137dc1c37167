//! Minimal YouTube Data API v3 client.
//!
//! Covers the one lookup a live notifier needs: `search.list` filtered to a
//! channel's currently live videos.

pub mod client;
pub mod error;
pub mod models;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use models::{LiveVideo, SearchItem, SearchResponse, Snippet, watch_url};
