//! In-memory change feed with manual event publication.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::realtime::{
    domain::{ChangeEvent, Collection},
    ports::{ChangeFeed, ChangeFeedError, ChangeFeedResult, ChangeHandler, SubscriptionId},
};

/// Thread-safe in-memory change feed.
///
/// Tests publish events directly; the feed fans each one out to every
/// handler subscribed to its collection.
#[derive(Clone, Default)]
pub struct InMemoryChangeFeed {
    state: Arc<RwLock<FeedState>>,
}

#[derive(Default)]
struct FeedState {
    handlers: HashMap<SubscriptionId, (Collection, ChangeHandler)>,
}

impl InMemoryChangeFeed {
    /// Creates a feed with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every handler watching its collection.
    pub fn publish(&self, event: &ChangeEvent) {
        // Handlers run outside the lock; one may subscribe or unsubscribe.
        let handlers: Vec<ChangeHandler> = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state
                .handlers
                .values()
                .filter(|(collection, _)| *collection == event.collection())
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };
        for handler in handlers {
            handler(event.clone());
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .len()
    }
}

#[async_trait]
impl ChangeFeed for InMemoryChangeFeed {
    async fn subscribe(
        &self,
        collection: Collection,
        handler: ChangeHandler,
    ) -> ChangeFeedResult<SubscriptionId> {
        let subscription = SubscriptionId::new();
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .insert(subscription, (collection, handler));
        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) -> ChangeFeedResult<()> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .remove(&subscription)
            .map(|_| ())
            .ok_or(ChangeFeedError::UnknownSubscription(subscription))
    }
}
