//! Wires configuration into a running monitor.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use youtube_api::YoutubeClient;

use crate::config::AppConfig;
use crate::gateway::{GatewayConfig, GatewayHandle};
use crate::monitor::{LiveStatusChecker, MonitorState, StreamMonitor, StreamMonitorConfig};
use crate::notification::{BotChannel, ChannelConfig, NotificationChannel, build_channel};
use crate::utils::http_client;
use crate::Result;

/// Build the monitor described by `config`.
pub fn build_monitor(config: &AppConfig) -> Result<StreamMonitor> {
    build_monitor_with_channel(config, build_channel(&config.channel))
}

/// Build a monitor that announces through `channel` instead of the configured one.
pub fn build_monitor_with_channel(
    config: &AppConfig,
    channel: Box<dyn NotificationChannel>,
) -> Result<StreamMonitor> {
    let http = http_client::build_client(http_client::REQUEST_TIMEOUT);
    let youtube = YoutubeClient::new(http, config.youtube.api_key.clone())
        .with_base_url(&config.youtube.api_base)?
        .with_timeout(http_client::REQUEST_TIMEOUT);

    let checker = LiveStatusChecker::new(youtube, config.youtube.channel_id.clone());

    Ok(StreamMonitor::new(
        checker,
        channel,
        StreamMonitorConfig {
            channel_name: config.youtube.channel_name.clone(),
            check_interval: config.check_interval,
        },
    ))
}

/// Run until `cancel` fires.
///
/// In bot mode the gateway session is started first and polling begins only
/// once it reports ready. Announcements made while the session is
/// reconnecting are dropped. A gateway that rejects the bot ends the run with
/// an error.
pub async fn run(config: AppConfig, cancel: CancellationToken) -> Result<MonitorState> {
    info!("Starting YouTube Live Monitor ({} mode)", config.channel.channel_type());

    let ChannelConfig::Bot(bot) = &config.channel else {
        let monitor = build_monitor(&config)?;
        return Ok(monitor.run(cancel).await);
    };

    // Child token so a dead gateway can stop the poll loop without touching the caller's token.
    let session_cancel = cancel.child_token();
    let mut gateway = GatewayHandle::spawn(GatewayConfig::from_bot(bot), session_cancel.clone());
    let channel = BotChannel::new(bot.clone()).with_readiness(gateway.readiness());
    let monitor = match build_monitor_with_channel(&config, Box::new(channel)) {
        Ok(monitor) => monitor,
        Err(e) => {
            session_cancel.cancel();
            gateway.join().await?;
            return Err(e);
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => {
            session_cancel.cancel();
            gateway.join().await?;
            return Ok(MonitorState::default());
        }
        ready = gateway.wait_until_ready() => {
            if let Err(e) = ready {
                session_cancel.cancel();
                gateway.join().await?;
                return Err(e);
            }
        }
    }

    let poll_cancel = session_cancel.clone();
    let (state, gateway_result) = tokio::join!(monitor.run(poll_cancel), async {
        let result = gateway.join().await;
        // stop polling if the session dies for good
        session_cancel.cancel();
        result
    });

    if let Err(e) = &gateway_result {
        warn!("Gateway session ended: {}", e);
    }
    gateway_result.map(|_| state)
}
