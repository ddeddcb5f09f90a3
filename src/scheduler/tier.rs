use std::time::Duration;

use crate::DebounceConfig;

/// Named delay bucket controlling how quickly a table's changes reach the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceTier {
    Instant,
    Fast,
    Normal,
    Slow,
}

impl DebounceTier {
    pub fn delay(
        &self,
        config: &DebounceConfig,
    ) -> Duration {
        let ms = match self {
            DebounceTier::Instant => config.instant_ms,
            DebounceTier::Fast => config.fast_ms,
            DebounceTier::Normal => config.normal_ms,
            DebounceTier::Slow => config.slow_ms,
        };
        Duration::from_millis(ms)
    }
}
