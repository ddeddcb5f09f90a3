use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;

lazy_static! {
    pub static ref EVENTS_RECEIVED: IntCounterVec = IntCounterVec::new(
        Opts::new("realtime_events_received", "Change events received per table"),
        &["table"]
    )
    .expect("metric can not be created");

    pub static ref EVENTS_COALESCED: IntCounterVec = IntCounterVec::new(
        Opts::new("realtime_events_coalesced", "Change events merged by the coalescer"),
        &["table"]
    )
    .expect("metric can not be created");

    pub static ref INVALIDATIONS_FIRED: IntCounter = IntCounter::new(
        "realtime_invalidations_fired",
        "Cache keys invalidated by the debounce scheduler"
    )
    .expect("metric can not be created");

    pub static ref FORCED_FLUSHES: IntCounter = IntCounter::new(
        "realtime_forced_flushes",
        "Times the pending-timer ceiling forced a synchronous flush"
    )
    .expect("metric can not be created");

    pub static ref PENDING_INVALIDATIONS: IntGauge = IntGauge::new(
        "realtime_pending_invalidations",
        "Invalidation timers currently pending"
    )
    .expect("metric can not be created");

    pub static ref RECONNECT_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new("realtime_reconnect_attempts", "Reconnect attempts per tenant"),
        &["tenant"]
    )
    .expect("metric can not be created");

    pub static ref NOTIFICATIONS_DISPATCHED: IntCounterVec = IntCounterVec::new(
        Opts::new("realtime_notifications_dispatched", "Sound/toast notifications per table"),
        &["table"]
    )
    .expect("metric can not be created");
}

/// Registers every realtime collector into the caller's registry.
///
/// Registering the same collectors twice into one registry is reported by
/// prometheus as an error; it is logged and otherwise ignored.
pub fn register_custom_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_RECEIVED.clone()),
        Box::new(EVENTS_COALESCED.clone()),
        Box::new(INVALIDATIONS_FIRED.clone()),
        Box::new(FORCED_FLUSHES.clone()),
        Box::new(PENDING_INVALIDATIONS.clone()),
        Box::new(RECONNECT_ATTEMPTS.clone()),
        Box::new(NOTIFICATIONS_DISPATCHED.clone()),
    ];

    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::warn!("collector can not be registered: {:?}", e);
        }
    }
}
