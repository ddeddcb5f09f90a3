use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_COALESCE_ALLOW_LIST;
use crate::Error;
use crate::Result;

/// Event coalescing settings
///
/// Database triggers and bulk updates can emit many events within a few
/// milliseconds for one user action. Events for the same table that land
/// inside `window_ms` of the first one are merged.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CoalesceConfig {
    /// Coalescing window in milliseconds
    /// Default: 50
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Tables that are never coalesced
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<String>,
}

impl Default for CoalesceConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            allow_list: default_allow_list(),
        }
    }
}

impl CoalesceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "coalesce.window_ms must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_window_ms() -> u64 {
    50
}

fn default_allow_list() -> Vec<String> {
    DEFAULT_COALESCE_ALLOW_LIST
        .iter()
        .map(|t| t.to_string())
        .collect()
}
