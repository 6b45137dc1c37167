//! Gateway session task.
//!
//! Runs on its own tokio task so heartbeats keep flowing while the poll loop
//! is busy. Readiness is published through a `watch` channel; the poll loop
//! waits on it once before its first check.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::protocol::{self, GatewayEvent, ReadyInfo};
use crate::notification::BotConfig;
use crate::utils::http_client;
use crate::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for `Hello` after the socket opens.
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Latest `READY` of the current connection; `None` while disconnected.
pub type Readiness = watch::Receiver<Option<ReadyInfo>>;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub intents: u64,
    pub base_reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
}

impl GatewayConfig {
    pub fn from_bot(bot: &BotConfig) -> Self {
        Self {
            url: bot.gateway_url.clone(),
            token: bot.token.clone(),
            ..Default::default()
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: BotConfig::DEFAULT_GATEWAY_URL.to_string(),
            token: String::new(),
            intents: protocol::INTENT_GUILDS,
            base_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(60),
        }
    }
}

/// Reconnect delay that doubles on each failed attempt up to a cap.
#[derive(Debug, Clone)]
struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Delay to wait now; the following call returns double, capped at `max`.
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Why a single connection ended.
#[derive(Debug, PartialEq, Eq)]
enum Disconnect {
    Cancelled,
    Reconnect { was_ready: bool },
}

/// Handle to a running gateway session.
pub struct GatewayHandle {
    ready_rx: Readiness,
    task: JoinHandle<Result<()>>,
}

impl GatewayHandle {
    /// Spawn the session task. It runs until `cancel` fires or the gateway
    /// rejects the bot for good.
    pub fn spawn(config: GatewayConfig, cancel: CancellationToken) -> Self {
        let (ready_tx, ready_rx) = watch::channel(None);
        let task = tokio::spawn(run(config, ready_tx, cancel));
        Self { ready_rx, task }
    }

    pub fn is_ready(&self) -> bool {
        self.ready_rx.borrow().is_some()
    }

    /// A receiver that follows readiness across reconnects.
    pub fn readiness(&self) -> Readiness {
        self.ready_rx.clone()
    }

    /// Wait for the first `READY`. Errors if the session ends before that.
    pub async fn wait_until_ready(&mut self) -> Result<ReadyInfo> {
        let ready = self
            .ready_rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Error::gateway("gateway session ended before READY"))?;
        ready
            .clone()
            .ok_or_else(|| Error::gateway("gateway session ended before READY"))
    }

    /// Wait for the session task to finish and surface its result.
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| Error::gateway(format!("gateway task panicked: {e}")))?
    }
}

async fn run(
    config: GatewayConfig,
    ready_tx: watch::Sender<Option<ReadyInfo>>,
    cancel: CancellationToken,
) -> Result<()> {
    http_client::install_rustls_provider();
    let mut backoff = Backoff::new(config.base_reconnect_delay, config.max_reconnect_delay);

    loop {
        if cancel.is_cancelled() {
            break;
        }

        info!("Connecting to Discord gateway");
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connect_async(config.url.as_str()) => result,
        };

        match connected {
            Ok((stream, _)) => match run_connection(stream, &config, &ready_tx, &cancel).await? {
                Disconnect::Cancelled => break,
                Disconnect::Reconnect { was_ready } => {
                    if was_ready {
                        backoff.reset();
                    }
                }
            },
            Err(e) => warn!("Gateway connection failed: {}", e),
        }

        ready_tx.send_replace(None);
        let delay = backoff.next_delay();
        debug!("Reconnecting to gateway in {:?}", delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => break,
        }
    }

    debug!("Gateway session stopped");
    Ok(())
}

async fn recv_hello(stream: &mut WsStream) -> Option<Duration> {
    let wait = async {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => match protocol::decode(text.as_str()) {
                    Ok(frame) => {
                        if let GatewayEvent::Hello { heartbeat_interval } = frame.event {
                            return Some(heartbeat_interval);
                        }
                    }
                    Err(e) => warn!("Failed to decode gateway frame: {}", e),
                },
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => {}
            }
        }
        None
    };

    tokio::time::timeout(HELLO_TIMEOUT, wait).await.ok().flatten()
}

async fn run_connection(
    mut stream: WsStream,
    config: &GatewayConfig,
    ready_tx: &watch::Sender<Option<ReadyInfo>>,
    cancel: &CancellationToken,
) -> Result<Disconnect> {
    let Some(heartbeat_interval) = recv_hello(&mut stream).await else {
        warn!("Gateway did not send Hello");
        return Ok(Disconnect::Reconnect { was_ready: false });
    };
    debug!("Gateway hello, heartbeat every {:?}", heartbeat_interval);

    if let Err(e) = stream.send(protocol::identify(&config.token, config.intents)).await {
        error!("Failed to send identify: {}", e);
        return Ok(Disconnect::Reconnect { was_ready: false });
    }

    let mut heartbeat_timer =
        tokio::time::interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
    heartbeat_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut sequence: Option<u64> = None;
    let mut awaiting_ack = false;
    let mut was_ready = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = stream.close(None).await;
                return Ok(Disconnect::Cancelled);
            }

            _ = heartbeat_timer.tick() => {
                if awaiting_ack {
                    warn!("Gateway heartbeat not acknowledged, reconnecting");
                    let _ = stream.close(None).await;
                    return Ok(Disconnect::Reconnect { was_ready });
                }
                if let Err(e) = stream.send(protocol::heartbeat(sequence)).await {
                    error!("Failed to send heartbeat: {}", e);
                    return Ok(Disconnect::Reconnect { was_ready });
                }
                awaiting_ack = true;
                trace!("Sent gateway heartbeat (seq {:?})", sequence);
            }

            msg = stream.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.as_ref().map(|f| u16::from(f.code));
                        let reason = frame.as_ref().map(|f| f.reason.to_string()).unwrap_or_default();
                        if let Some(code) = code.filter(|c| protocol::is_fatal_close(*c)) {
                            return Err(Error::gateway(format!(
                                "gateway closed the session ({code}): {reason}"
                            )));
                        }
                        warn!("Gateway closed connection ({:?}): {}", code, reason);
                        return Ok(Disconnect::Reconnect { was_ready });
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("Gateway websocket error: {}", e);
                        return Ok(Disconnect::Reconnect { was_ready });
                    }
                    None => {
                        warn!("Gateway stream closed");
                        return Ok(Disconnect::Reconnect { was_ready });
                    }
                };

                let frame = match protocol::decode(text.as_str()) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Failed to decode gateway frame: {}", e);
                        continue;
                    }
                };
                if frame.sequence.is_some() {
                    sequence = frame.sequence;
                }

                match frame.event {
                    GatewayEvent::Ready(ready) => {
                        info!("{} has connected to Discord!", ready.username);
                        info!("Bot is in {} server(s)", ready.guild_count);
                        debug!("Gateway session id {:?}", ready.session_id);
                        was_ready = true;
                        ready_tx.send_replace(Some(ready));
                    }
                    GatewayEvent::HeartbeatRequest => {
                        if let Err(e) = stream.send(protocol::heartbeat(sequence)).await {
                            error!("Failed to answer heartbeat request: {}", e);
                            return Ok(Disconnect::Reconnect { was_ready });
                        }
                    }
                    GatewayEvent::HeartbeatAck => awaiting_ack = false,
                    GatewayEvent::Reconnect => {
                        info!("Gateway requested reconnect");
                        let _ = stream.close(None).await;
                        return Ok(Disconnect::Reconnect { was_ready });
                    }
                    GatewayEvent::InvalidSession => {
                        warn!("Gateway invalidated the session");
                        let _ = stream.close(None).await;
                        return Ok(Disconnect::Reconnect { was_ready });
                    }
                    GatewayEvent::Dispatch { name } => trace!("Ignoring dispatch {:?}", name),
                    GatewayEvent::Hello { .. } | GatewayEvent::Unknown { .. } => {}
                }
            }
        }
    }
}
