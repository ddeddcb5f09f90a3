use std::sync::Arc;

use hotel_realtime::constants::*;
use hotel_realtime::ChangeEvent;
use hotel_realtime::ConnectionState;
use hotel_realtime::FilePermissionStore;
use hotel_realtime::MemoryChangeFeed;
use hotel_realtime::QueryKey;
use hotel_realtime::RealtimeConfig;
use hotel_realtime::Record;
use hotel_realtime::SoundCue;
use hotel_realtime::SubscriptionScope;
use serde_json::json;
use serde_json::Value;
use tokio::time::sleep;
use tokio::time::sleep_until;
use tokio::time::Instant;

use crate::common::ms;
use crate::common::RecordingSound;
use crate::common::TestEnv;

fn row(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn front_desk(tenant_id: &str) -> SubscriptionScope {
    SubscriptionScope::new(tenant_id, "FRONT_DESK")
}

#[tokio::test(start_paused = true)]
async fn rooms_update_reaches_cache_on_next_tick() {
    let mut env = TestEnv::default_env();
    env.coordinator.start(front_desk("T1")).await.unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    let published_at = Instant::now();
    let old = row(json!({"id": 101, "tenant_id": "T1", "status": "dirty"}));
    let new = row(json!({"id": 101, "tenant_id": "T1", "status": "clean"}));
    env.feed.publish(ChangeEvent::update(ROOMS, old, new));
    sleep(ms(1)).await;

    for name in [Q_ROOMS, Q_ROOM_AVAILABILITY, Q_ROOM_TYPES] {
        assert_eq!(
            env.cache.times_of(&QueryKey::new(name, "T1")),
            vec![published_at],
            "{name} not invalidated immediately"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn payments_burst_invalidates_once_after_last_event() {
    let mut env = TestEnv::default_env();
    env.coordinator.start(front_desk("T1")).await.unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    for i in 0..10u64 {
        env.feed.publish(ChangeEvent::insert(
            PAYMENTS,
            row(json!({"id": i, "tenant_id": "T1", "amount": 25})),
        ));
        sleep(ms(3)).await;
    }
    let last_event = Instant::now() - ms(3);

    sleep_until(last_event + ms(499)).await;
    let payments = QueryKey::new(Q_PAYMENTS, "T1");
    assert!(env.cache.times_of(&payments).is_empty(), "fired before 500ms");

    sleep_until(last_event + ms(600)).await;
    let fired = env.cache.times_of(&payments);
    assert_eq!(fired.len(), 1);
    assert!(fired[0] - last_event >= ms(500));

    // Allow-listed: every insert was processed, so every insert notified.
    assert_eq!(env.sound.played(), vec![SoundCue::Payment; 10]);
}

#[tokio::test(start_paused = true)]
async fn housekeeping_never_sees_financial_tables() {
    let mut env = TestEnv::default_env();
    env.coordinator
        .start(SubscriptionScope::new("T1", "housekeeping"))
        .await
        .unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    let tables = env.feed.requests()[0].tables().into_iter().map(String::from).collect::<Vec<_>>();
    assert!(!tables.is_empty());
    assert!(!tables.iter().any(|t| t == PAYMENTS || t == FOLIOS || t == FOLIO_CHARGES));

    assert_eq!(
        env.feed.publish(ChangeEvent::insert(PAYMENTS, row(json!({"tenant_id": "T1"})))),
        0
    );
    sleep(ms(1_000)).await;
    assert!(env.cache.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn other_tenants_rows_are_filtered_out() {
    let mut env = TestEnv::default_env();
    env.coordinator.start(front_desk("T1")).await.unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    env.feed.publish(ChangeEvent::insert(RESERVATIONS, row(json!({"tenant_id": "T2"}))));
    env.feed.publish(ChangeEvent::insert(RESERVATIONS, row(json!({"tenant_id": "T1"}))));
    sleep(ms(10)).await;

    assert_eq!(env.cache.tenants(), vec!["T1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn staff_notification_targets_recipient() {
    let mut env = TestEnv::default_env();
    env.coordinator
        .start(front_desk("T1").with_user("staff-7"))
        .await
        .unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    let for_someone_else = row(json!({
        "tenant_id": "T1", "recipient_id": "staff-9", "title": "Shift swap", "message": "Can you cover?"
    }));
    let for_me = row(json!({
        "tenant_id": "T1", "recipient_id": "staff-7", "title": "VIP arrival", "message": "Room 301 at 15:00"
    }));
    let for_housekeeping = row(json!({
        "tenant_id": "T1", "target_role": "HOUSEKEEPING", "title": "Linen", "message": "Restock floor 2"
    }));
    env.feed.publish(ChangeEvent::insert(STAFF_NOTIFICATIONS, for_someone_else));
    env.feed.publish(ChangeEvent::insert(STAFF_NOTIFICATIONS, for_me));
    env.feed.publish(ChangeEvent::insert(STAFF_NOTIFICATIONS, for_housekeeping));
    sleep(ms(10)).await;

    let shown = env.messages.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "VIP arrival");
    assert_eq!(shown[0].description, "Room 301 at 15:00");
    assert_eq!(shown[0].duration, ms(5_000));
    assert_eq!(env.sound.played(), vec![SoundCue::StaffAlert]);
}

#[tokio::test(start_paused = true)]
async fn rejected_sound_does_not_disturb_pipeline() {
    let sound = RecordingSound {
        reject: true,
        ..Default::default()
    };
    let mut env = TestEnv::new(
        RealtimeConfig::default(),
        MemoryChangeFeed::new(),
        sound,
        Arc::new(hotel_realtime::PermissionFlag::new(true)),
    );
    env.coordinator.start(front_desk("T1")).await.unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    env.feed.publish(ChangeEvent::insert(
        GUEST_MESSAGES,
        row(json!({"tenant_id": "T1", "message": "Late checkout?"})),
    ));
    sleep(ms(150)).await;

    assert_eq!(env.sound.played(), vec![SoundCue::Message]);
    assert_eq!(env.messages.shown()[0].description, "Late checkout?");
    assert_eq!(env.cache.times_of(&QueryKey::new(Q_GUEST_MESSAGES, "T1")).len(), 1);
    assert!(env.status.borrow().is_healthy());
}

#[tokio::test(start_paused = true)]
async fn persisted_permission_is_read_on_every_event() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilePermissionStore::new(dir.path().join("notifications"));
    store.grant().unwrap();

    let mut env = TestEnv::new(
        RealtimeConfig::default(),
        MemoryChangeFeed::new(),
        RecordingSound::default(),
        Arc::new(store.clone()),
    );
    env.coordinator.start(front_desk("T1")).await.unwrap();
    env.wait_for_state(ConnectionState::Subscribed).await;

    let request = || ChangeEvent::insert(GUEST_REQUESTS, row(json!({"tenant_id": "T1", "request_type": "Iron"})));
    env.feed.publish(request());
    sleep(ms(10)).await;
    store.revoke().unwrap();
    env.feed.publish(request());
    sleep(ms(10)).await;

    let shown = env.messages.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "New Guest Request");
    assert_eq!(shown[0].description, "Iron");
}
