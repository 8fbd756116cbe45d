//! Recording notifier for asserting on toast output.

use crate::pipeline::ports::Notifier;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Category of a recorded notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Positive outcome.
    Success,
    /// Failure surfaced to the user.
    Error,
    /// Neutral information.
    Info,
}

/// One captured toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Category of the toast.
    pub kind: NoticeKind,
    /// Message presented to the user.
    pub message: String,
    /// Requested display duration, when the caller set one.
    pub duration: Option<Duration>,
}

/// Notifier that captures every toast for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<RwLock<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, kind: NoticeKind, message: &str, duration: Option<Duration>) {
        self.notices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice {
                kind,
                message: message.to_owned(),
                duration,
            });
    }

    /// Returns every captured notice in emission order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many notices of `kind` were captured.
    #[must_use]
    pub fn count_of(&self, kind: NoticeKind) -> usize {
        self.notices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|notice| notice.kind == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str, duration: Option<Duration>) {
        self.record(NoticeKind::Success, message, duration);
    }

    fn error(&self, message: &str, duration: Option<Duration>) {
        self.record(NoticeKind::Error, message, duration);
    }

    fn info(&self, message: &str, duration: Option<Duration>) {
        self.record(NoticeKind::Info, message, duration);
    }
}
