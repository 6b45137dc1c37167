//! Local stand-ins for the YouTube search endpoint and Discord.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use live_notifier::config::{AppConfig, Args, DEFAULT_CHANNEL_ID, NotifierMode};
use live_notifier::notification::BotConfig;
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// One scripted answer from the search stub.
#[derive(Debug, Clone)]
pub enum Poll {
    Live(&'static str, &'static str),
    Offline,
    Fail,
}

/// Search endpoint that replays a script, then reports offline.
#[derive(Default)]
pub struct YoutubeStub {
    script: Mutex<VecDeque<Poll>>,
    hits: AtomicUsize,
}

impl YoutubeStub {
    pub fn new(script: impl IntoIterator<Item = Poll>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            hits: AtomicUsize::new(0),
        })
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Queue another answer behind whatever is left of the script.
    pub async fn push(&self, poll: Poll) {
        self.script.lock().await.push_back(poll);
    }

    pub async fn serve(self: &Arc<Self>) -> String {
        let router = Router::new()
            .route("/youtube/v3/search", get(search))
            .with_state(self.clone());
        spawn(router).await
    }
}

async fn search(State(stub): State<Arc<YoutubeStub>>) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let next = stub.script.lock().await.pop_front().unwrap_or(Poll::Offline);
    match next {
        Poll::Live(id, title) => Json(json!({
            "kind": "youtube#searchListResponse",
            "items": [{
                "id": { "kind": "youtube#video", "videoId": id },
                "snippet": { "title": title, "liveBroadcastContent": "live" }
            }]
        }))
        .into_response(),
        Poll::Offline => Json(json!({ "kind": "youtube#searchListResponse", "items": [] }))
            .into_response(),
        Poll::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "code": 500, "message": "backend error" } })),
        )
            .into_response(),
    }
}

/// Records every message posted to Discord.
pub struct DiscordStub {
    status: StatusCode,
    pub messages: Mutex<Vec<Value>>,
    pub authorizations: Mutex<Vec<Option<String>>>,
    pub channel_ids: Mutex<Vec<String>>,
}

impl DiscordStub {
    pub fn new(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            status,
            messages: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
            channel_ids: Mutex::new(Vec::new()),
        })
    }

    pub async fn message_count(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Serves `/webhook` and `/api/channels/{id}/messages`.
    pub async fn serve(self: &Arc<Self>) -> String {
        let router = Router::new()
            .route("/webhook", post(webhook))
            .route("/api/channels/{id}/messages", post(create_message))
            .with_state(self.clone());
        spawn(router).await
    }
}

async fn webhook(State(stub): State<Arc<DiscordStub>>, Json(body): Json<Value>) -> StatusCode {
    stub.messages.lock().await.push(body);
    if stub.status.is_success() {
        StatusCode::NO_CONTENT
    } else {
        stub.status
    }
}

async fn create_message(
    State(stub): State<Arc<DiscordStub>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.authorizations.lock().await.push(auth);
    stub.channel_ids.lock().await.push(id);
    stub.messages.lock().await.push(body);
    (stub.status, Json(json!({ "id": "1" }))).into_response()
}

/// How the gateway stub behaves. The `*Once` variants misbehave on the first
/// connection only and act like `Ready` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayBehavior {
    Ready,
    RejectToken,
    /// READY, then op 7 right away.
    ReconnectOnce,
    /// op 9 instead of READY.
    InvalidSessionOnce,
    /// READY, then a non-fatal close (4000).
    CloseOnce,
    /// READY, but heartbeats are never acknowledged.
    NoAckOnce,
    /// READY, then op 7 in place of the first heartbeat ack; later
    /// connections never get READY.
    ReconnectThenStall,
}

pub struct GatewayStub {
    behavior: GatewayBehavior,
    pub identifies: Mutex<Vec<Value>>,
    pub heartbeats: AtomicUsize,
    pub connections: AtomicUsize,
}

impl GatewayStub {
    pub fn new(behavior: GatewayBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            identifies: Mutex::new(Vec::new()),
            heartbeats: AtomicUsize::new(0),
            connections: AtomicUsize::new(0),
        })
    }

    pub async fn identify_count(&self) -> usize {
        self.identifies.lock().await.len()
    }

    /// Returns the `ws://` url of the gateway.
    pub async fn serve(self: &Arc<Self>) -> String {
        let router = Router::new()
            .route("/gateway", get(gateway))
            .with_state(self.clone());
        let base = spawn(router).await;
        format!("{}/gateway", base.replacen("http://", "ws://", 1))
    }
}

async fn gateway(State(stub): State<Arc<GatewayStub>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| gateway_session(stub, socket))
}

fn text(value: Value) -> Message {
    Message::Text(value.to_string().into())
}

/// READY carrying `session-{connection}` so tests can tell sessions apart.
fn ready_frame(connection: usize) -> Message {
    text(json!({
        "op": 0,
        "s": 1,
        "t": "READY",
        "d": {
            "v": 10,
            "user": { "id": "99", "username": "LiveBot", "bot": true },
            "guilds": [{ "id": "1", "unavailable": true }],
            "session_id": format!("session-{connection}")
        }
    }))
}

fn close_frame(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

async fn gateway_session(stub: Arc<GatewayStub>, mut socket: WebSocket) {
    let connection = stub.connections.fetch_add(1, Ordering::SeqCst) + 1;
    let first = connection == 1;
    let behavior = stub.behavior;

    let hello = json!({ "op": 10, "d": { "heartbeat_interval": 100 }, "s": null, "t": null });
    if socket.send(text(hello)).await.is_err() {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(body) = msg else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(body.as_str()) else {
            continue;
        };

        match value["op"].as_u64() {
            Some(2) => {
                stub.identifies.lock().await.push(value);
                let replies = match behavior {
                    GatewayBehavior::RejectToken => {
                        let _ = socket
                            .send(close_frame(4004, "Authentication failed."))
                            .await;
                        return;
                    }
                    GatewayBehavior::InvalidSessionOnce if first => {
                        vec![text(json!({ "op": 9, "d": false }))]
                    }
                    GatewayBehavior::ReconnectOnce if first => {
                        vec![ready_frame(connection), text(json!({ "op": 7, "d": null }))]
                    }
                    GatewayBehavior::ReconnectThenStall if first => vec![ready_frame(connection)],
                    GatewayBehavior::CloseOnce if first => {
                        vec![ready_frame(connection), close_frame(4000, "Unknown error")]
                    }
                    GatewayBehavior::ReconnectThenStall => Vec::new(),
                    _ => vec![ready_frame(connection)],
                };
                for reply in replies {
                    if socket.send(reply).await.is_err() {
                        return;
                    }
                }
            }
            Some(1) => {
                stub.heartbeats.fetch_add(1, Ordering::SeqCst);
                if behavior == GatewayBehavior::NoAckOnce && first {
                    continue;
                }
                if behavior == GatewayBehavior::ReconnectThenStall && first {
                    let _ = socket.send(text(json!({ "op": 7, "d": null }))).await;
                    continue;
                }
                if socket.send(text(json!({ "op": 11 }))).await.is_err() {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Flags with every optional value unset.
pub fn base_args(youtube_base: &str) -> Args {
    Args {
        youtube_api_key: Some("test-key".to_string()),
        youtube_channel_id: DEFAULT_CHANNEL_ID.to_string(),
        youtube_channel_name: "Test Channel".to_string(),
        youtube_api_base: youtube_base.to_string(),
        discord_webhook_url: None,
        discord_token: None,
        discord_channel_id: None,
        discord_api_base: BotConfig::DEFAULT_API_BASE.to_string(),
        discord_gateway_url: BotConfig::DEFAULT_GATEWAY_URL.to_string(),
        check_interval_secs: 1,
        mode: NotifierMode::Auto,
        log_dir: None,
    }
}

pub fn webhook_config(youtube_base: &str, discord_base: &str) -> AppConfig {
    let args = Args {
        discord_webhook_url: Some(format!("{discord_base}/webhook")),
        ..base_args(youtube_base)
    };
    AppConfig::from_args(args).unwrap()
}

pub fn bot_config(youtube_base: &str, discord_base: &str, gateway_url: &str) -> AppConfig {
    let args = Args {
        mode: NotifierMode::Bot,
        discord_token: Some("bot-token".to_string()),
        discord_channel_id: Some("123456".to_string()),
        discord_api_base: format!("{discord_base}/api"),
        discord_gateway_url: gateway_url.to_string(),
        ..base_args(youtube_base)
    };
    AppConfig::from_args(args).unwrap()
}
