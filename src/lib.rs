//! Realtime synchronization and cache invalidation for a multi-tenant hotel
//! management client.
//!
//! One multiplexed change-feed channel per tenant and role fans row changes
//! out into a query cache:
//!
//! ```text
//! ChangeFeed -> EventCoalescer -> NotificationDispatcher (side channel)
//!                              -> DebounceScheduler -> QueryCache
//! ```
//!
//! [`RealtimeCoordinator`] owns the pipeline for the active scope and the
//! [`ConnectionSupervisor`] recovers the channel with exponential backoff.
//!
//! ```ignore
//! let config = RealtimeConfig::new()?;
//! let (signals, host) = HostSignals::channel();
//! let mut coordinator = RealtimeCoordinator::new(config, deps, signals)?;
//! coordinator
//!     .update_session(SubscriptionScope::from_session(Some("T1"), Some("FRONT_DESK")))
//!     .await?;
//! ```

mod access;
mod cache;
mod coalescer;
mod config;
mod coordinator;
mod errors;
mod feed;
mod host;
mod model;
mod notify;
mod scheduler;
mod supervisor;
pub(crate) mod utils;

pub mod constants;
pub mod metrics;

pub use access::*;
pub use cache::*;
pub use coalescer::*;
pub use self::config::*;
pub use coordinator::*;
pub use errors::*;
pub use feed::*;
pub use host::*;
pub use model::*;
pub use notify::*;
pub use scheduler::*;
pub use supervisor::*;


//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
