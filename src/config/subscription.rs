use serde::Deserialize;
use serde::Serialize;

/// Controls which tables a scope subscribes to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubscriptionConfig {
    /// Subscribe only to the tables the role observes. When false, every
    /// known table is subscribed regardless of role.
    #[serde(default = "default_role_filtering")]
    pub role_filtering: bool,

    /// Emit debug logs for idle scopes, unknown roles and forced flushes
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            role_filtering: default_role_filtering(),
            verbose: false,
        }
    }
}

fn default_role_filtering() -> bool {
    true
}
