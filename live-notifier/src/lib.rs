//! live-notifier library crate.
//!
//! Watches one YouTube channel and announces each new live stream on Discord,
//! either through a webhook or as a bot.

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod utils;

pub use error::{Error, Result};
