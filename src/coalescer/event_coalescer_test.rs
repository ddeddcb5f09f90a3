use std::time::Duration;

use tokio::time::Instant;

use super::*;
use crate::constants::*;
use crate::CoalesceConfig;

fn coalescer() -> EventCoalescer {
    EventCoalescer::new(&CoalesceConfig::default())
}

#[test]
fn test_first_event_opens_window() {
    let mut coalescer = coalescer();
    let now = Instant::now();

    assert!(!coalescer.should_skip(ROOMS, now));
    let state = coalescer.window_state(ROOMS).unwrap();
    assert_eq!(state.count, 1);
    assert_eq!(state.first_event_at, now);
}

#[test]
fn test_burst_within_window_is_merged() {
    let mut coalescer = coalescer();
    let start = Instant::now();

    let processed = (0..10)
        .filter(|i| !coalescer.should_skip(ROOMS, start + Duration::from_millis(i * 3)))
        .count();

    assert_eq!(processed, 1);
    assert_eq!(coalescer.window_state(ROOMS).unwrap().count, 10);
}

#[test]
fn test_window_boundary_resets_state() {
    let mut coalescer = coalescer();
    let start = Instant::now();

    assert!(!coalescer.should_skip(RESERVATIONS, start));
    assert!(coalescer.should_skip(RESERVATIONS, start + Duration::from_millis(49)));
    // exactly 50ms since the first event opens a new window
    assert!(!coalescer.should_skip(RESERVATIONS, start + Duration::from_millis(50)));

    let state = coalescer.window_state(RESERVATIONS).unwrap();
    assert_eq!(state.count, 1);
    assert_eq!(state.first_event_at, start + Duration::from_millis(50));
}

#[test]
fn test_allow_listed_tables_are_never_skipped() {
    let mut coalescer = coalescer();
    let start = Instant::now();

    for table in [PAYMENTS, GUEST_REQUESTS, GUEST_MESSAGES, STAFF_NOTIFICATIONS, QR_ORDERS] {
        let processed = (0..10)
            .filter(|i| !coalescer.should_skip(table, start + Duration::from_millis(i * 3)))
            .count();
        assert_eq!(processed, 10, "{table} should not be coalesced");
        assert!(coalescer.window_state(table).is_none());
    }
}

#[test]
fn test_tables_are_tracked_independently() {
    let mut coalescer = coalescer();
    let now = Instant::now();

    assert!(!coalescer.should_skip(ROOMS, now));
    assert!(!coalescer.should_skip(HOUSEKEEPING_TASKS, now));
    assert!(coalescer.should_skip(ROOMS, now));
}

#[test]
fn test_custom_allow_list_and_reset() {
    let config = CoalesceConfig {
        window_ms: 50,
        allow_list: vec![ROOMS.to_string()],
    };
    let mut coalescer = EventCoalescer::new(&config);
    let now = Instant::now();

    assert!(coalescer.is_allow_listed(ROOMS));
    assert!(!coalescer.should_skip(ROOMS, now));
    assert!(!coalescer.should_skip(ROOMS, now));

    assert!(!coalescer.should_skip(PAYMENTS, now));
    assert!(coalescer.should_skip(PAYMENTS, now));
    coalescer.reset();
    assert!(!coalescer.should_skip(PAYMENTS, now));
}
