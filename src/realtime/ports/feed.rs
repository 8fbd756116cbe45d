//! Realtime change-feed port.

use crate::realtime::domain::{ChangeEvent, Collection};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for change feed operations.
pub type ChangeFeedResult<T> = Result<T, ChangeFeedError>;

/// Callback receiving pushed change notifications.
pub type ChangeHandler = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Opaque handle to an established subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a new random subscription identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Realtime change-notification transport.
///
/// Push-only and best-effort: delivery is at-least-once with no ordering
/// guarantee relative to local writes, and there is no acknowledgement or
/// redelivery contract.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribes `handler` to every change on `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeFeedError::Transport`] when the subscription cannot
    /// be established.
    async fn subscribe(
        &self,
        collection: Collection,
        handler: ChangeHandler,
    ) -> ChangeFeedResult<SubscriptionId>;

    /// Tears down a subscription. No handler invocation happens after this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeFeedError::UnknownSubscription`] when the handle is
    /// not (or no longer) registered.
    async fn unsubscribe(&self, subscription: SubscriptionId) -> ChangeFeedResult<()>;
}

/// Errors returned by change feed implementations.
#[derive(Debug, Clone, Error)]
pub enum ChangeFeedError {
    /// The subscription handle is unknown.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),

    /// Transport-layer failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChangeFeedError {
    /// Wraps a transport error.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
