//! Quiescence-window debouncing of change notifications.

use crate::realtime::domain::{ChangeEvent, Collection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Debounce windows for scheduling the consumer refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceWindows {
    default_window: Duration,
    stage_change_window: Duration,
}

impl DebounceWindows {
    /// Creates explicit windows.
    #[must_use]
    pub const fn new(default_window: Duration, stage_change_window: Duration) -> Self {
        Self {
            default_window,
            stage_change_window,
        }
    }

    /// Returns the window for ordinary notifications.
    #[must_use]
    pub const fn default_window(self) -> Duration {
        self.default_window
    }

    /// Returns the extended window for contact stage changes.
    #[must_use]
    pub const fn stage_change_window(self) -> Duration {
        self.stage_change_window
    }
}

impl Default for DebounceWindows {
    fn default() -> Self {
        Self {
            default_window: Duration::from_millis(1000),
            stage_change_window: Duration::from_millis(1500),
        }
    }
}

/// Coalesces notification bursts into at most one refetch per quiescence
/// window.
///
/// All notifications share a single timer slot: every observed event cancels
/// the pending timer and arms a new one, so the callback fires one window
/// after the burst goes quiet. Contact stage changes arm a longer window,
/// giving a just-confirmed optimistic move time to settle before a refetch
/// could otherwise show overwritten state. The layer cannot tell its own
/// writes from another client's, so this is a heuristic against flicker, not
/// a correctness guarantee; the board's confirmed-move overlay provides the
/// actual protection.
///
/// Cheap to clone; clones share the timer slot. Methods must be called from
/// within a tokio runtime.
#[derive(Clone)]
pub struct ReconciliationDebouncer {
    inner: Arc<DebouncerInner>,
}

struct DebouncerInner {
    on_data_change: Arc<dyn Fn() + Send + Sync>,
    windows: DebounceWindows,
    pending: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl DebouncerInner {
    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReconciliationDebouncer {
    /// Creates a debouncer with the default windows.
    #[must_use]
    pub fn new(on_data_change: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self::with_windows(on_data_change, DebounceWindows::default())
    }

    /// Creates a debouncer with explicit windows.
    #[must_use]
    pub fn with_windows(on_data_change: Arc<dyn Fn() + Send + Sync>, windows: DebounceWindows) -> Self {
        Self {
            inner: Arc::new(DebouncerInner {
                on_data_change,
                windows,
                pending: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Feeds one notification into the debounce slot.
    ///
    /// Dashboard-config changes are consumed by an unrelated consumer and
    /// never touch the timer.
    pub fn observe(&self, event: &ChangeEvent) {
        if event.collection() == Collection::DashboardConfigs {
            tracing::trace!("dashboard config change ignored by reconciliation");
            return;
        }
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let window = if event.is_stage_transition() {
            self.inner.windows.stage_change_window()
        } else {
            self.inner.windows.default_window()
        };
        tracing::trace!(
            collection = ?event.collection(),
            kind = ?event.kind(),
            ?window,
            "change observed; refetch rescheduled"
        );

        let inner = Arc::clone(&self.inner);
        let mut pending = self.inner.lock_pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if inner.closed.load(Ordering::SeqCst) {
                return;
            }
            tracing::debug!("quiescence window elapsed; triggering refetch");
            (inner.on_data_change)();
        }));
    }

    /// Cancels any pending timer and prevents every further callback.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        if let Some(pending) = self.inner.lock_pending().take() {
            pending.abort();
        }
    }
}
