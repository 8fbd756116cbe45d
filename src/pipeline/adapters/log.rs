//! Log-backed notifier for headless and test deployments.

use crate::pipeline::ports::Notifier;
use std::time::Duration;

/// Notifier that emits toasts as structured log events.
///
/// Useful where no presentation layer is attached (workers, integration
/// environments); the UI wires its own [`Notifier`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a log-backed notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn success(&self, message: &str, duration: Option<Duration>) {
        tracing::info!(message, ?duration, "toast: success");
    }

    fn error(&self, message: &str, duration: Option<Duration>) {
        tracing::warn!(message, ?duration, "toast: error");
    }

    fn info(&self, message: &str, duration: Option<Duration>) {
        tracing::info!(message, ?duration, "toast: info");
    }
}
