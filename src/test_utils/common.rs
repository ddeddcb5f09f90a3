use std::time::Duration;

use tokio::time::Instant;

use crate::DebounceConfig;
use crate::SubscriptionScope;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub fn front_desk_scope(tenant_id: &str) -> SubscriptionScope {
    SubscriptionScope::new(tenant_id, "FRONT_DESK")
}

pub fn debounce_config(max_pending: usize) -> DebounceConfig {
    DebounceConfig {
        max_pending,
        ..Default::default()
    }
}

/// Virtual time elapsed since `start`, in whole milliseconds
pub fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
