//! Discord gateway frames.
//!
//! Only the handful of opcodes needed to keep a bot session alive are
//! understood; every other dispatch is surfaced as [`GatewayEvent::Dispatch`]
//! and ignored by the session.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::Result;

pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// `GUILDS` intent; enough for the bot to show up in its servers.
pub const INTENT_GUILDS: u64 = 1 << 0;

#[derive(Debug, Deserialize)]
struct RawPayload {
    op: u8,
    #[serde(default)]
    d: serde_json::Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelloData {
    heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
struct ReadyData {
    user: ReadyUser,
    #[serde(default)]
    guilds: Vec<serde_json::Value>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadyUser {
    username: String,
}

/// Bot identity reported by `READY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyInfo {
    pub username: String,
    pub guild_count: usize,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Hello { heartbeat_interval: Duration },
    Ready(ReadyInfo),
    /// Any other dispatch (`op 0`).
    Dispatch { name: Option<String> },
    /// Server asks for an immediate heartbeat.
    HeartbeatRequest,
    HeartbeatAck,
    Reconnect,
    InvalidSession,
    Unknown { op: u8 },
}

/// A decoded frame plus the sequence number it carried, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: GatewayEvent,
    pub sequence: Option<u64>,
}

pub fn decode(text: &str) -> Result<Frame> {
    let raw: RawPayload = serde_json::from_str(text)?;

    let event = match raw.op {
        opcode::HELLO => {
            let hello: HelloData = serde_json::from_value(raw.d)?;
            GatewayEvent::Hello {
                heartbeat_interval: Duration::from_millis(hello.heartbeat_interval),
            }
        }
        opcode::DISPATCH if raw.t.as_deref() == Some("READY") => {
            let ready: ReadyData = serde_json::from_value(raw.d)?;
            GatewayEvent::Ready(ReadyInfo {
                username: ready.user.username,
                guild_count: ready.guilds.len(),
                session_id: ready.session_id,
            })
        }
        opcode::DISPATCH => GatewayEvent::Dispatch { name: raw.t },
        opcode::HEARTBEAT => GatewayEvent::HeartbeatRequest,
        opcode::HEARTBEAT_ACK => GatewayEvent::HeartbeatAck,
        opcode::RECONNECT => GatewayEvent::Reconnect,
        opcode::INVALID_SESSION => GatewayEvent::InvalidSession,
        op => GatewayEvent::Unknown { op },
    };

    Ok(Frame {
        event,
        sequence: raw.s,
    })
}

pub fn identify(token: &str, intents: u64) -> Message {
    let payload = json!({
        "op": opcode::IDENTIFY,
        "d": {
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "live-notifier",
                "device": "live-notifier",
            }
        }
    });
    Message::text(payload.to_string())
}

pub fn heartbeat(sequence: Option<u64>) -> Message {
    Message::text(json!({ "op": opcode::HEARTBEAT, "d": sequence }).to_string())
}

/// Close codes after which reconnecting cannot help (bad token, bad intents,
/// bad API version, sharding required).
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010..=4014)
}
