//! Per-scope realtime pipeline and the coordinator that owns it.
//!
//! One [`RealtimeCoordinator`] per consumer. Each active scope runs as one
//! spawned task. Changing scope tears the old task down completely before the
//! new one subscribes.

mod pipeline;
mod realtime_coordinator;
mod status;

pub use realtime_coordinator::*;
pub use status::*;
