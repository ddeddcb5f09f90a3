//! Query-cache sink the scheduler invalidates into.

use crate::QueryKey;

/// Key-value query cache that can mark entries stale.
///
/// # Design Rules
///
/// - `invalidate()` must be fast and non-blocking; the next read of the key
///   does the refetch, not this call
/// - Invalidating a key that is not cached is a no-op
pub trait QueryCache: Send + Sync + 'static {
    fn invalidate(
        &self,
        key: &QueryKey,
    );
}

/// Discards every invalidation. For embedders that only want notifications.
#[derive(Clone, Debug, Default)]
pub struct NoOpQueryCache;

impl QueryCache for NoOpQueryCache {
    fn invalidate(
        &self,
        _key: &QueryKey,
    ) {
    }
}
