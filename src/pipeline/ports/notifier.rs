//! Ephemeral user-notification port.

use std::time::Duration;

/// Toast-style notification sink.
///
/// Fire-and-forget: implementations present the message for the given
/// duration (or their default when `None`) and never report back.
pub trait Notifier: Send + Sync {
    /// Presents a success message.
    fn success(&self, message: &str, duration: Option<Duration>);

    /// Presents an error message.
    fn error(&self, message: &str, duration: Option<Duration>);

    /// Presents an informational message.
    fn info(&self, message: &str, duration: Option<Duration>);
}
