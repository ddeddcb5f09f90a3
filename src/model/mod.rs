//! Data carried through the realtime pipeline: inbound change events, the
//! scope a channel is opened for, and the cache keys it invalidates.

mod event;
mod query_key;
mod scope;

pub use event::*;
pub use query_key::*;
pub use scope::*;
