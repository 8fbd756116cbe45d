//! Port contracts for the realtime reconciliation layer.

pub mod feed;

pub use feed::{ChangeFeed, ChangeFeedError, ChangeFeedResult, ChangeHandler, SubscriptionId};
