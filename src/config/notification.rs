use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Sound and transient-message notification settings
///
/// The user-level opt-in lives in the persisted permission flag, not here;
/// `enabled = false` switches the dispatcher off for the whole deployment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How long a transient message stays on screen (milliseconds)
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            toast_duration_ms: default_toast_duration_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.toast_duration_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "notifications.toast_duration_ms must be greater than 0".into(),
            )));
        }
        Ok(())
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_toast_duration_ms() -> u64 {
    5000
}
