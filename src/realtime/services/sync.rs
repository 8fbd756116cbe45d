//! Subscription wiring between a change feed and the debouncer.

use crate::realtime::{
    domain::Collection,
    ports::{ChangeFeed, ChangeFeedResult, ChangeHandler, SubscriptionId},
    services::{DebounceWindows, ReconciliationDebouncer},
};
use std::sync::{Arc, Mutex, PoisonError};

/// Established realtime reconciliation: one subscription per watched
/// collection, all routed into a shared [`ReconciliationDebouncer`].
pub struct RealtimeSync<F>
where
    F: ChangeFeed,
{
    feed: Arc<F>,
    debouncer: ReconciliationDebouncer,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl<F> RealtimeSync<F>
where
    F: ChangeFeed,
{
    /// Subscribes every watched collection with the default debounce
    /// windows.
    ///
    /// # Errors
    ///
    /// Returns the feed's error when any subscription cannot be
    /// established; subscriptions set up before the failure are torn back
    /// down best-effort.
    pub async fn start(
        feed: Arc<F>,
        on_data_change: Arc<dyn Fn() + Send + Sync>,
    ) -> ChangeFeedResult<Self> {
        Self::start_with_windows(feed, on_data_change, DebounceWindows::default()).await
    }

    /// Subscribes every watched collection with explicit debounce windows.
    ///
    /// # Errors
    ///
    /// Returns the feed's error when any subscription cannot be
    /// established; subscriptions set up before the failure are torn back
    /// down best-effort.
    pub async fn start_with_windows(
        feed: Arc<F>,
        on_data_change: Arc<dyn Fn() + Send + Sync>,
        windows: DebounceWindows,
    ) -> ChangeFeedResult<Self> {
        let debouncer = ReconciliationDebouncer::with_windows(on_data_change, windows);
        let mut subscriptions = Vec::with_capacity(Collection::ALL.len());

        for collection in Collection::ALL {
            let observer = debouncer.clone();
            let handler: ChangeHandler = Arc::new(move |event| observer.observe(&event));
            match feed.subscribe(collection, handler).await {
                Ok(subscription) => subscriptions.push(subscription),
                Err(err) => {
                    debouncer.shutdown();
                    unsubscribe_all(feed.as_ref(), subscriptions).await;
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            subscriptions = subscriptions.len(),
            "realtime reconciliation established"
        );
        Ok(Self {
            feed,
            debouncer,
            subscriptions: Mutex::new(subscriptions),
        })
    }

    /// Tears down every subscription and the debouncer.
    ///
    /// No refetch callback fires after this returns. Idempotent.
    pub async fn shutdown(&self) {
        self.debouncer.shutdown();
        let subscriptions = std::mem::take(
            &mut *self
                .subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        unsubscribe_all(self.feed.as_ref(), subscriptions).await;
    }
}

/// Best-effort unsubscription; failures are logged, not propagated.
async fn unsubscribe_all<F>(feed: &F, subscriptions: Vec<SubscriptionId>)
where
    F: ChangeFeed,
{
    for subscription in subscriptions {
        if let Err(err) = feed.unsubscribe(subscription).await {
            tracing::warn!(%subscription, error = %err, "failed to unsubscribe channel");
        }
    }
}
