use std::sync::Arc;

use hotel_realtime::constants::*;
use hotel_realtime::ChangeEvent;
use hotel_realtime::ConnectionState;
use hotel_realtime::MemoryChangeFeed;
use hotel_realtime::PermissionFlag;
use hotel_realtime::QueryKey;
use hotel_realtime::RealtimeConfig;
use hotel_realtime::RealtimeStatus;
use hotel_realtime::SubscriptionScope;
use hotel_realtime::TransportError;
use serde_json::json;
use tokio::time::sleep;

use crate::common::ms;
use crate::common::RecordingSound;
use crate::common::TestEnv;

fn insert(
    table: &str,
    tenant_id: &str,
) -> ChangeEvent {
    let row = json!({"tenant_id": tenant_id});
    ChangeEvent::insert(table, row.as_object().cloned().unwrap_or_default())
}

fn manual_env() -> TestEnv {
    TestEnv::new(
        RealtimeConfig::default(),
        MemoryChangeFeed::manual(),
        RecordingSound::default(),
        Arc::new(PermissionFlag::new(false)),
    )
}

#[tokio::test(start_paused = true)]
async fn tenant_change_cancels_timers_before_new_channel_opens() {
    let mut env = TestEnv::default_env();
    env.coordinator
        .update_session(SubscriptionScope::from_session(Some("T1"), Some("FRONT_DESK")))
        .await
        .unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    env.feed.publish(insert(FOLIOS, "T1"));
    env.feed.publish(insert(GUESTS, "T1"));
    env.status.wait_for(|s| s.pending_invalidations > 0).await.unwrap();

    env.coordinator
        .update_session(SubscriptionScope::from_session(Some("T2"), Some("FRONT_DESK")))
        .await
        .unwrap();

    let status = env.wait_for_state(ConnectionState::Subscribed).await;
    assert_eq!(status.pending_invalidations, 0);
    assert_eq!(status.scope.unwrap().tenant_id(), "T2");
    assert_eq!(env.feed.open_channels(), 1);

    sleep(ms(10_000)).await;
    assert!(env.cache.keys().is_empty(), "stale scope invalidated: {:?}", env.cache.keys());
}

#[tokio::test(start_paused = true)]
async fn blank_session_suspends_subscription() {
    let mut env = TestEnv::default_env();
    env.coordinator
        .update_session(SubscriptionScope::from_session(Some("T1"), Some("POS")))
        .await
        .unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    env.coordinator
        .update_session(SubscriptionScope::from_session(Some(" "), Some("POS")))
        .await
        .unwrap();

    assert_eq!(*env.status.borrow(), RealtimeStatus::idle(None));
    assert_eq!(env.feed.open_channels(), 0);
    assert!(!env.coordinator.reconnect());
}

#[tokio::test(start_paused = true)]
async fn unacknowledged_retries_accumulate_until_join() {
    let mut env = manual_env();
    env.coordinator.start(SubscriptionScope::new("T1", "MAINTENANCE")).await.unwrap();
    sleep(ms(1)).await;
    env.feed.acknowledge();
    env.wait_for_state(ConnectionState::Subscribed).await;

    env.feed.fail(TransportError::ChannelError("socket reset".into()));
    sleep(ms(1_001)).await;
    env.feed.fail(TransportError::ChannelError("socket reset".into()));
    sleep(ms(2_001)).await;

    let status = env.status.borrow().clone();
    assert_eq!(status.state, ConnectionState::Subscribing);
    assert_eq!(status.attempts, 2);
    assert!(status.is_healthy());

    env.feed.acknowledge();
    let status = env.wait_for_state(ConnectionState::Subscribed).await;
    assert_eq!(status.attempts, 0);
    assert_eq!(status.last_error, None);

    env.feed.publish(insert(MAINTENANCE_REQUESTS, "T1"));
    sleep(ms(400)).await;
    assert_eq!(env.cache.keys().len(), 2);
    assert!(env.cache.keys().contains(&QueryKey::new(Q_MAINTENANCE_REQUESTS, "T1")));
}

#[tokio::test(start_paused = true)]
async fn unavailable_feed_is_retried_with_backoff() {
    let mut env = TestEnv::default_env();
    env.feed.set_unavailable(Some("realtime disabled"));

    env.coordinator.start(SubscriptionScope::new("T1", "OWNER")).await.unwrap();
    let status = env.wait_for_state(ConnectionState::Reconnecting).await;
    assert_eq!(
        status.last_error,
        Some(TransportError::FeedUnavailable("realtime disabled".to_string()))
    );
    assert!(env.feed.requests().is_empty());

    env.feed.set_unavailable(None);
    sleep(ms(1_001)).await;

    let status = env.wait_for_state(ConnectionState::Subscribed).await;
    assert_eq!(status.subscribed_tables.len(), ALL_TABLES.len());
    assert_eq!(env.feed.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_coordinator_releases_channel() {
    let mut env = TestEnv::default_env();
    env.coordinator.start(SubscriptionScope::new("T1", "FRONT_DESK")).await.unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;
    env.feed.publish(insert(PAYMENTS, "T1"));
    sleep(ms(1)).await;

    let TestEnv {
        coordinator,
        feed,
        cache,
        ..
    } = env;
    drop(coordinator);
    sleep(ms(1_000)).await;

    assert_eq!(feed.open_channels(), 0);
    assert!(cache.keys().is_empty());
}
