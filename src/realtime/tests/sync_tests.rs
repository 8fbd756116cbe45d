//! Tests for subscription wiring over the in-memory change feed.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use crate::realtime::adapters::memory::InMemoryChangeFeed;
use crate::realtime::domain::Collection;
use crate::realtime::services::{DebounceWindows, RealtimeSync};
use crate::realtime::tests::{RefetchProbe, contact_insert, contact_stage_change, dashboard_update};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

#[rstest]
#[tokio::test(start_paused = true)]
async fn start_subscribes_every_watched_collection() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();

    let sync = RealtimeSync::start(Arc::clone(&feed), probe.callback())
        .await
        .expect("subscriptions established");

    assert_eq!(feed.subscription_count(), Collection::ALL.len());
    sync.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn published_events_reach_the_debouncer() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();
    let sync = RealtimeSync::start(Arc::clone(&feed), probe.callback())
        .await
        .expect("subscriptions established");

    feed.publish(&contact_insert());
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(probe.count(), 1);

    sync.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stage_changes_arrive_with_the_longer_window() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();
    let sync = RealtimeSync::start(Arc::clone(&feed), probe.callback())
        .await
        .expect("subscriptions established");

    feed.publish(&contact_stage_change());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(probe.count(), 0);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(probe.count(), 1);

    sync.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn dashboard_events_are_delivered_but_ignored() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();
    let sync = RealtimeSync::start(Arc::clone(&feed), probe.callback())
        .await
        .expect("subscriptions established");

    feed.publish(&dashboard_update());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.count(), 0);

    sync.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn custom_windows_apply_to_routed_events() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();
    let windows = DebounceWindows::new(Duration::from_millis(40), Duration::from_millis(60));
    let sync = RealtimeSync::start_with_windows(Arc::clone(&feed), probe.callback(), windows)
        .await
        .expect("subscriptions established");

    feed.publish(&contact_insert());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(probe.count(), 1);

    sync.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_unsubscribes_and_silences_callbacks() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();
    let sync = RealtimeSync::start(Arc::clone(&feed), probe.callback())
        .await
        .expect("subscriptions established");

    feed.publish(&contact_insert());
    sync.shutdown().await;

    assert_eq!(feed.subscription_count(), 0);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.count(), 0, "pending timer cancelled by shutdown");

    // Events published after teardown go nowhere.
    feed.publish(&contact_insert());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.count(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_is_idempotent() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let probe = RefetchProbe::new();
    let sync = RealtimeSync::start(Arc::clone(&feed), probe.callback())
        .await
        .expect("subscriptions established");

    sync.shutdown().await;
    sync.shutdown().await;
    assert_eq!(feed.subscription_count(), 0);
}
