//! Configuration management for the realtime synchronization layer.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
//!
//! The coalescing window, debounce tiers, pending-timer ceiling and reconnect
//! constants are empirical tuning values; they live here so a deployment can
//! adjust them without code changes.
mod coalesce;
mod debounce;
mod notification;
mod retry;
mod subscription;
pub use coalesce::*;
pub use debounce::*;
pub use notification::*;
pub use retry::*;
pub use subscription::*;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the realtime pipeline
///
/// Combines all component configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct RealtimeConfig {
    /// Event coalescing window and never-coalesced tables
    #[serde(default)]
    pub coalesce: CoalesceConfig,
    /// Debounce tier delays and the pending-timer ceiling
    #[serde(default)]
    pub debounce: DebounceConfig,
    /// Reconnection backoff and liveness checks
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    /// Sound and toast notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Which tables get subscribed, and how loudly
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

impl Debug for RealtimeConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("debounce", &self.debounce)
            .field("reconnect", &self.reconnect)
            .finish_non_exhaustive()
    }
}

impl RealtimeConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `REALTIME__` prefix (highest priority)
    ///
    /// # Note
    /// This method does NOT validate the configuration. Callers MUST call
    /// `validate()` before handing the configuration to a coordinator.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("REALTIME__DEBOUNCE__MAX_PENDING", "80");
    /// let cfg = RealtimeConfig::new()?.validate()?;
    /// assert_eq!(cfg.debounce.max_pending, 80);
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(Self::environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.coalesce.validate()?;
        self.debounce.validate()?;
        self.reconnect.validate()?;
        self.notifications.validate()?;
        Ok(self)
    }

    fn environment() -> Environment {
        Environment::with_prefix("REALTIME")
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true)
    }
}
