//! The poll/notify loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::detector::LiveStatusChecker;
use super::state::{LiveCheck, MonitorState};
use crate::config::{DEFAULT_CHANNEL_NAME, DEFAULT_CHECK_INTERVAL_SECS};
use crate::notification::{LiveNotification, NotificationChannel};

#[derive(Debug, Clone)]
pub struct StreamMonitorConfig {
    /// Display name used in announcements.
    pub channel_name: String,
    /// Pause between the end of one poll and the start of the next.
    pub check_interval: Duration,
}

impl Default for StreamMonitorConfig {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

/// Polls the channel on a fixed interval and announces each new stream once.
pub struct StreamMonitor {
    checker: LiveStatusChecker,
    channel: Box<dyn NotificationChannel>,
    config: StreamMonitorConfig,
}

impl StreamMonitor {
    pub fn new(
        checker: LiveStatusChecker,
        channel: Box<dyn NotificationChannel>,
        config: StreamMonitorConfig,
    ) -> Self {
        Self {
            checker,
            channel,
            config,
        }
    }

    /// One iteration: poll, fold into `state`, announce if newly live.
    pub async fn tick(&self, state: MonitorState) -> (MonitorState, LiveCheck) {
        let (state, check) = self.checker.check(state).await;

        if let LiveCheck::NewlyLive { video_id, title } = &check {
            let notification = LiveNotification::new(&self.config.channel_name, video_id, title);
            self.notify(&notification).await;
        }

        (state, check)
    }

    /// Deliver one announcement. Failures are logged and dropped.
    async fn notify(&self, notification: &LiveNotification) {
        match self.channel.send(notification).await {
            Ok(()) => {
                info!(
                    "Sent live notification for video: {} via {}",
                    notification.video_id,
                    self.channel.channel_type()
                );
            }
            Err(e) => {
                warn!(
                    video_id = %notification.video_id,
                    channel = self.channel.channel_type(),
                    error = %e,
                    "Error sending Discord message"
                );
            }
        }
    }

    /// Run from a fresh state until cancelled.
    pub async fn run(&self, cancel: CancellationToken) -> MonitorState {
        self.run_with_state(MonitorState::default(), cancel).await
    }

    /// Run until cancelled and return the final state.
    pub async fn run_with_state(
        &self,
        mut state: MonitorState,
        cancel: CancellationToken,
    ) -> MonitorState {
        info!(
            "Monitoring YouTube channel {} every {:?}",
            self.checker.channel_id(),
            self.config.check_interval
        );

        loop {
            // A poll in flight is allowed to finish; cancellation takes effect
            // at the next sleep.
            let (next, _) = self.tick(state).await;
            state = next;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.check_interval) => {}
            }
        }

        debug!("Stream monitor stopped");
        state
    }
}
