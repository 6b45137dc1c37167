//! Discord gateway session for the bot transport.
//!
//! The bot posts announcements over REST, but Discord only shows it online
//! while a gateway websocket is open and heartbeating. This module keeps that
//! session alive and reconnects with exponential backoff when it drops.

pub mod protocol;
mod session;

pub use protocol::ReadyInfo;
pub use session::{GatewayConfig, GatewayHandle, Readiness};
