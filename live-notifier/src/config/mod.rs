//! Startup configuration.
//!
//! Every setting is a CLI flag backed by an environment variable, so the
//! notifier can be driven purely from the environment (or a `.env` file).
//! [`AppConfig::from_args`] validates the raw flags once at startup; any
//! failure there is fatal and happens before the first poll.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::notification::channels::{BotConfig, ChannelConfig, WebhookConfig};
use crate::{Error, Result};

/// Channel watched when `YOUTUBE_CHANNEL_ID` is not set (The White House).
pub const DEFAULT_CHANNEL_ID: &str = "UCYxRlFDqcWM4y7FfpiAN3KQ";
pub const DEFAULT_CHANNEL_NAME: &str = "White House";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierMode {
    /// Webhook when a webhook URL is configured, bot otherwise.
    Auto,
    Webhook,
    Bot,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "live-notifier", version, about)]
pub struct Args {
    /// YouTube Data API key.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Channel to watch.
    #[arg(long, env = "YOUTUBE_CHANNEL_ID", default_value = DEFAULT_CHANNEL_ID)]
    pub youtube_channel_id: String,

    /// Display name used in the announcement title.
    #[arg(long, env = "YOUTUBE_CHANNEL_NAME", default_value = DEFAULT_CHANNEL_NAME)]
    pub youtube_channel_name: String,

    #[arg(long, env = "YOUTUBE_API_BASE", default_value = youtube_api::YoutubeClient::DEFAULT_BASE_URL)]
    pub youtube_api_base: String,

    /// Discord webhook URL (webhook mode).
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub discord_webhook_url: Option<String>,

    /// Discord bot token (bot mode).
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Numeric Discord channel id the bot posts into (bot mode).
    #[arg(long, env = "DISCORD_CHANNEL_ID")]
    pub discord_channel_id: Option<String>,

    #[arg(long, env = "DISCORD_API_BASE", default_value = BotConfig::DEFAULT_API_BASE)]
    pub discord_api_base: String,

    #[arg(long, env = "DISCORD_GATEWAY_URL", default_value = BotConfig::DEFAULT_GATEWAY_URL)]
    pub discord_gateway_url: String,

    /// Seconds between polls.
    #[arg(long, env = "CHECK_INTERVAL_SECS", default_value_t = DEFAULT_CHECK_INTERVAL_SECS)]
    pub check_interval_secs: u64,

    #[arg(long, env = "NOTIFIER_MODE", value_enum, default_value_t = NotifierMode::Auto)]
    pub mode: NotifierMode,

    /// Directory for daily rotated log files. Console only when unset.
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// What to watch on YouTube.
#[derive(Debug, Clone)]
pub struct YoutubeSettings {
    pub api_key: String,
    pub channel_id: String,
    pub channel_name: String,
    pub api_base: String,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub youtube: YoutubeSettings,
    pub channel: ChannelConfig,
    pub check_interval: Duration,
    pub log_dir: Option<PathBuf>,
}

/// Treat unset and blank values the same.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(value: Option<String>, name: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::config(format!("{name} environment variable is required")))
}

fn validate_http_url(value: &str, name: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| Error::config(format!("{name} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(format!(
            "{name} must be an http(s) URL, got scheme '{other}'"
        ))),
    }
}

impl AppConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        let webhook_url = non_empty(args.discord_webhook_url);
        let mode = match args.mode {
            NotifierMode::Auto if webhook_url.is_some() => NotifierMode::Webhook,
            NotifierMode::Auto if non_empty(args.discord_token.clone()).is_some() => {
                NotifierMode::Bot
            }
            NotifierMode::Auto => {
                return Err(Error::config(
                    "either DISCORD_WEBHOOK_URL or DISCORD_TOKEN and DISCORD_CHANNEL_ID are required",
                ));
            }
            explicit => explicit,
        };

        let channel = match mode {
            NotifierMode::Webhook => {
                let url = require(webhook_url, "DISCORD_WEBHOOK_URL")?;
                validate_http_url(&url, "DISCORD_WEBHOOK_URL")?;
                ChannelConfig::Webhook(WebhookConfig {
                    url,
                    ..Default::default()
                })
            }
            NotifierMode::Bot | NotifierMode::Auto => {
                let token = require(args.discord_token, "DISCORD_TOKEN")?;
                let channel_id = require(args.discord_channel_id, "DISCORD_CHANNEL_ID")?;
                let channel_id = channel_id.parse::<u64>().map_err(|_| {
                    Error::config(format!(
                        "DISCORD_CHANNEL_ID must be a numeric channel id, got '{channel_id}'"
                    ))
                })?;
                validate_http_url(&args.discord_api_base, "DISCORD_API_BASE")?;
                ChannelConfig::Bot(BotConfig {
                    token,
                    channel_id,
                    api_base: args.discord_api_base.trim_end_matches('/').to_string(),
                    gateway_url: args.discord_gateway_url,
                    ..Default::default()
                })
            }
        };

        let api_key = require(args.youtube_api_key, "YOUTUBE_API_KEY")?;
        let channel_id = non_empty(Some(args.youtube_channel_id))
            .unwrap_or_else(|| DEFAULT_CHANNEL_ID.to_string());
        let channel_name = non_empty(Some(args.youtube_channel_name))
            .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string());
        validate_http_url(&args.youtube_api_base, "YOUTUBE_API_BASE")?;

        if args.check_interval_secs == 0 {
            return Err(Error::config("CHECK_INTERVAL_SECS must be greater than 0"));
        }

        Ok(Self {
            youtube: YoutubeSettings {
                api_key,
                channel_id,
                channel_name,
                api_base: args.youtube_api_base,
            },
            channel,
            check_interval: Duration::from_secs(args.check_interval_secs),
            log_dir: args.log_dir,
        })
    }
}
