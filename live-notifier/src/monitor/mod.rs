//! Stream monitor: live status detection and the poll loop.

mod detector;
mod service;
mod state;

pub use detector::LiveStatusChecker;
pub use service::{StreamMonitor, StreamMonitorConfig};
pub use state::{LiveCheck, MonitorState};
