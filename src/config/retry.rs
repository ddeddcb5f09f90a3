use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::MAX_DELAY_MS;
use crate::Error;
use crate::Result;

/// Reconnection policy for the change-feed channel
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Recover from channel errors automatically. When false the first
    /// error is terminal.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of reconnect attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Liveness check period (unit: milliseconds)
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// How long a new channel may stay unacknowledged before it counts as
    /// failed (unit: milliseconds)
    #[serde(default = "default_subscribe_timeout_ms")]
    pub subscribe_timeout_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            subscribe_timeout_ms: default_subscribe_timeout_ms(),
        }
    }
}

impl ReconnectPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.base_delay_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "reconnect.base_delay_ms must be at least 1ms".into(),
            )));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "reconnect.max_delay_ms({}) must be >= base_delay_ms({})",
                self.max_delay_ms, self.base_delay_ms
            ))));
        }

        if self.max_delay_ms > MAX_DELAY_MS {
            return Err(Error::Config(ConfigError::Message(format!(
                "reconnect.max_delay_ms({}) must not exceed {}ms",
                self.max_delay_ms, MAX_DELAY_MS
            ))));
        }

        if !(1000..=MAX_DELAY_MS).contains(&self.heartbeat_interval_ms) {
            return Err(Error::Config(ConfigError::Message(format!(
                "reconnect.heartbeat_interval_ms must be between 1000ms and {}ms",
                MAX_DELAY_MS
            ))));
        }

        if !(1..=MAX_DELAY_MS).contains(&self.subscribe_timeout_ms) {
            return Err(Error::Config(ConfigError::Message(format!(
                "reconnect.subscribe_timeout_ms must be between 1ms and {}ms",
                MAX_DELAY_MS
            ))));
        }

        Ok(())
    }

    /// Delay before the next reconnect, given the attempts already made.
    ///
    /// `min(base * 2^attempts, max)`: 1000, 2000, 4000, 8000, 16000, 30000...
    /// Never longer than `MAX_DELAY_MS`, even for an unvalidated policy.
    pub fn backoff_delay(
        &self,
        attempts: u32,
    ) -> Duration {
        let factor = 1u64.checked_shl(attempts).unwrap_or(u64::MAX);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
            .min(MAX_DELAY_MS);
        Duration::from_millis(delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn subscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.subscribe_timeout_ms)
    }
}

fn default_enabled() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    5
}
fn default_base_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_heartbeat_interval_ms() -> u64 {
    30_000
}
fn default_subscribe_timeout_ms() -> u64 {
    10_000
}
