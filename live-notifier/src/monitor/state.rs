//! Live/offline bookkeeping between polls.
//!
//! [`MonitorState`] is a plain value: each poll consumes the previous state
//! and returns the next one together with a [`LiveCheck`]. Nothing here
//! touches the network, so every transition can be tested directly.

use youtube_api::LiveVideo;

/// What the poll loop remembers between checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    /// Video id of the stream we last announced.
    pub last_notified_video_id: Option<String>,
    pub is_currently_live: bool,
}

/// Result of one poll after it has been folded into the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveCheck {
    /// A stream we have not announced yet.
    NewlyLive { video_id: String, title: String },
    /// The stream we already announced is still running.
    StillLive { video_id: String, title: String },
    NotLive,
}

impl LiveCheck {
    pub fn should_notify(&self) -> bool {
        matches!(self, LiveCheck::NewlyLive { .. })
    }

    pub fn video_id(&self) -> Option<&str> {
        match self {
            LiveCheck::NewlyLive { video_id, .. } | LiveCheck::StillLive { video_id, .. } => {
                Some(video_id)
            }
            LiveCheck::NotLive => None,
        }
    }
}

impl MonitorState {
    /// Fold a successful observation into the state.
    ///
    /// `Some(video)` means the search returned at least one live result;
    /// `None` means the channel is offline.
    pub fn observe(self, observation: Option<&LiveVideo>) -> (MonitorState, LiveCheck) {
        match observation {
            Some(video)
                if self.last_notified_video_id.as_deref() != Some(video.video_id.as_str()) =>
            {
                (
                    MonitorState {
                        last_notified_video_id: Some(video.video_id.clone()),
                        is_currently_live: true,
                    },
                    LiveCheck::NewlyLive {
                        video_id: video.video_id.clone(),
                        title: video.title.clone(),
                    },
                )
            }
            Some(video) => (
                MonitorState {
                    is_currently_live: true,
                    ..self
                },
                LiveCheck::StillLive {
                    video_id: video.video_id.clone(),
                    title: video.title.clone(),
                },
            ),
            None if self.is_currently_live => (MonitorState::default(), LiveCheck::NotLive),
            None => (self, LiveCheck::NotLive),
        }
    }

    /// Fold a poll result into the state. A failed poll reports `NotLive`
    /// and leaves the state untouched.
    pub fn apply<E>(self, result: &Result<Option<LiveVideo>, E>) -> (MonitorState, LiveCheck) {
        match result {
            Ok(observation) => self.observe(observation.as_ref()),
            Err(_) => (self, LiveCheck::NotLive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(id: &str) -> LiveVideo {
        LiveVideo::new(id, format!("stream {id}"))
    }

    #[test]
    fn test_session_lifecycle() {
        let state = MonitorState::default();

        let (state, check) = state.observe(Some(&live("abc")));
        assert_eq!(
            check,
            LiveCheck::NewlyLive {
                video_id: "abc".to_string(),
                title: "stream abc".to_string()
            }
        );
        assert!(state.is_currently_live);
        assert_eq!(state.last_notified_video_id.as_deref(), Some("abc"));

        let (state, check) = state.observe(Some(&live("abc")));
        assert!(matches!(check, LiveCheck::StillLive { .. }));
        assert!(!check.should_notify());

        let (state, check) = state.observe(None);
        assert_eq!(check, LiveCheck::NotLive);
        assert_eq!(state, MonitorState::default());

        let (_, check) = state.observe(Some(&live("abc")));
        assert!(check.should_notify());
        assert_eq!(check.video_id(), Some("abc"));
    }

    #[test]
    fn test_new_video_while_live_notifies() {
        let (state, _) = MonitorState::default().observe(Some(&live("first")));
        let (state, check) = state.observe(Some(&live("second")));
        assert!(check.should_notify());
        assert_eq!(state.last_notified_video_id.as_deref(), Some("second"));
    }

    #[test]
    fn test_offline_when_already_offline_is_noop() {
        let (state, check) = MonitorState::default().observe(None);
        assert_eq!(check, LiveCheck::NotLive);
        assert_eq!(state, MonitorState::default());
    }

    #[test]
    fn test_failed_poll_keeps_state() {
        let (state, _) = MonitorState::default().observe(Some(&live("abc")));
        let before = state.clone();

        let failed: Result<Option<LiveVideo>, &str> = Err("timeout");
        let (state, check) = state.apply(&failed);
        assert_eq!(check, LiveCheck::NotLive);
        assert_eq!(state, before);

        // Still the same session, so no second announcement.
        let (_, check) = state.apply::<&str>(&Ok(Some(live("abc"))));
        assert!(matches!(check, LiveCheck::StillLive { .. }));
    }

    #[test]
    fn test_at_most_one_notification_per_session() {
        let polls = [
            Some("a"),
            Some("a"),
            None,
            None,
            Some("a"),
            Some("b"),
            Some("b"),
            None,
            Some("b"),
            Some("b"),
        ];

        let mut state = MonitorState::default();
        let mut announced = Vec::new();
        for poll in polls {
            let video = poll.map(live);
            let (next, check) = state.observe(video.as_ref());
            if let LiveCheck::NewlyLive { video_id, .. } = check {
                announced.push(video_id);
            }
            state = next;
        }

        assert_eq!(announced, vec!["a", "a", "b", "b"]);
    }
}
