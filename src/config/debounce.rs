use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::MAX_DELAY_MS;
use crate::Error;
use crate::Result;

/// Debounce scheduler settings
///
/// Each table maps to a tier; the tier picks the delay below. While the
/// consuming surface is hidden the delay is multiplied by `hidden_multiplier`.
///
/// ```toml
/// [debounce]
/// slow_ms = 800
/// max_pending = 80
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DebounceConfig {
    /// Rooms and reservations. Default: 0
    #[serde(default = "default_instant_ms")]
    pub instant_ms: u64,

    /// Guest-facing, QR, housekeeping and order tables. Default: 100
    #[serde(default = "default_fast_ms")]
    pub fast_ms: u64,

    /// Secondary aggregates. Default: 300
    #[serde(default = "default_normal_ms")]
    pub normal_ms: u64,

    /// Financial tables. Kept slow to avoid invalidation feedback loops.
    /// Default: 500
    #[serde(default = "default_slow_ms")]
    pub slow_ms: u64,

    /// Delay multiplier applied while the surface is not visible. Default: 5
    #[serde(default = "default_hidden_multiplier")]
    pub hidden_multiplier: u32,

    /// Ceiling on pending invalidation timers. Reaching it forces a flush.
    /// Default: 50
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            instant_ms: default_instant_ms(),
            fast_ms: default_fast_ms(),
            normal_ms: default_normal_ms(),
            slow_ms: default_slow_ms(),
            hidden_multiplier: default_hidden_multiplier(),
            max_pending: default_max_pending(),
        }
    }
}

impl DebounceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.instant_ms <= self.fast_ms && self.fast_ms <= self.normal_ms && self.normal_ms <= self.slow_ms) {
            return Err(Error::Config(ConfigError::Message(format!(
                "debounce tiers must be non-decreasing: instant({}) <= fast({}) <= normal({}) <= slow({})",
                self.instant_ms, self.fast_ms, self.normal_ms, self.slow_ms
            ))));
        }

        if self.slow_ms > MAX_DELAY_MS {
            return Err(Error::Config(ConfigError::Message(format!(
                "debounce.slow_ms({}) must not exceed {}ms",
                self.slow_ms, MAX_DELAY_MS
            ))));
        }

        if self.hidden_multiplier == 0 {
            return Err(Error::Config(ConfigError::Message(
                "debounce.hidden_multiplier must be at least 1".into(),
            )));
        }

        if self.max_pending == 0 {
            return Err(Error::Config(ConfigError::Message(
                "debounce.max_pending must be at least 1".into(),
            )));
        }

        Ok(())
    }

    /// Never longer than `MAX_DELAY_MS`.
    pub fn hidden_delay(
        &self,
        base: Duration,
    ) -> Duration {
        base.saturating_mul(self.hidden_multiplier)
            .min(Duration::from_millis(MAX_DELAY_MS))
    }
}

fn default_instant_ms() -> u64 {
    0
}
fn default_fast_ms() -> u64 {
    100
}
fn default_normal_ms() -> u64 {
    300
}
fn default_slow_ms() -> u64 {
    500
}
fn default_hidden_multiplier() -> u32 {
    5
}
fn default_max_pending() -> usize {
    50
}
