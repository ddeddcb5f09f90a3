use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::poll_fn;
use prometheus::IntGauge;
use tokio_util::time::delay_queue;
use tokio_util::time::DelayQueue;
use tracing::debug;
use tracing::trace;

use crate::constants::MAX_DELAY_MS;
use crate::metrics::FORCED_FLUSHES;
use crate::metrics::INVALIDATIONS_FIRED;
use crate::metrics::PENDING_INVALIDATIONS;
use crate::DebounceConfig;
use crate::QueryCache;
use crate::QueryKey;
use crate::Visibility;

/// One armed invalidation timer
#[derive(Debug)]
pub struct PendingInvalidation {
    handle: delay_queue::Key,
    delay: Duration,
}

impl PendingInvalidation {
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Per-key debounced cache invalidation.
///
/// At most one timer is pending per key: scheduling a key again cancels the
/// armed timer and re-arms it with the new delay. `pending_count` never grows
/// past `max_pending`; reaching the ceiling flushes every pending key into the
/// cache synchronously.
///
/// Owned by the pipeline task; timers only fire while that task polls
/// [`DebounceScheduler::fire_next`].
///
/// Several schedulers may live in one process, so the pending gauge is moved
/// by this scheduler's own deltas and never overwritten.
pub struct DebounceScheduler {
    config: DebounceConfig,
    cache: Arc<dyn QueryCache>,
    queue: DelayQueue<QueryKey>,
    pending: HashMap<QueryKey, PendingInvalidation>,
    pending_count: usize,
    pending_gauge: IntGauge,
    verbose: bool,
}

impl std::fmt::Debug for DebounceScheduler {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("DebounceScheduler")
            .field("pending_count", &self.pending_count)
            .field("max_pending", &self.config.max_pending)
            .finish_non_exhaustive()
    }
}

impl DebounceScheduler {
    pub fn new(
        config: DebounceConfig,
        cache: Arc<dyn QueryCache>,
        verbose: bool,
    ) -> Self {
        Self {
            config,
            cache,
            queue: DelayQueue::new(),
            pending: HashMap::new(),
            pending_count: 0,
            pending_gauge: PENDING_INVALIDATIONS.clone(),
            verbose,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_pending_gauge(
        mut self,
        gauge: IntGauge,
    ) -> Self {
        self.pending_gauge = gauge;
        self
    }

    /// Schedules invalidation of `keys` after `delay`.
    ///
    /// While hidden the delay is multiplied by `hidden_multiplier`. Delays are
    /// capped at `MAX_DELAY_MS`. Returns how many keys were force-flushed to
    /// make room (0 if none).
    pub fn invalidate(
        &mut self,
        keys: &[QueryKey],
        delay: Duration,
        visibility: Visibility,
    ) -> usize {
        let delay = match visibility {
            Visibility::Visible => delay,
            Visibility::Hidden => self.config.hidden_delay(delay),
        }
        .min(Duration::from_millis(MAX_DELAY_MS));

        let mut flushed = 0;
        if self.pending_count >= self.config.max_pending {
            flushed += self.flush_all();
        }

        for key in keys {
            self.cancel(key);

            if self.pending_count >= self.config.max_pending {
                flushed += self.flush_all();
            }

            let handle = self.queue.insert(key.clone(), delay);
            self.pending.insert(key.clone(), PendingInvalidation { handle, delay });
            self.set_pending_count(self.pending_count + 1);
            trace!(%key, delay_ms = delay.as_millis() as u64, "invalidation scheduled");
        }

        flushed
    }

    /// Waits for the next timer and invalidates its key.
    ///
    /// Resolves to `None` immediately when nothing is pending.
    pub async fn fire_next(&mut self) -> Option<QueryKey> {
        let expired = poll_fn(|cx| self.queue.poll_expired(cx)).await?;
        let key = expired.into_inner();

        if self.pending.remove(&key).is_some() {
            self.set_pending_count(self.pending_count.saturating_sub(1));
        }

        self.cache.invalidate(&key);
        INVALIDATIONS_FIRED.inc();
        trace!(%key, "invalidation fired");
        Some(key)
    }

    /// Fires every pending timer now, in key order, and clears all state.
    pub fn flush_all(&mut self) -> usize {
        let mut keys: Vec<QueryKey> = self.pending.drain().map(|(key, _)| key).collect();
        keys.sort();
        self.queue.clear();
        self.set_pending_count(0);

        for key in &keys {
            self.cache.invalidate(key);
        }
        INVALIDATIONS_FIRED.inc_by(keys.len() as u64);
        FORCED_FLUSHES.inc();

        if self.verbose {
            debug!(flushed = keys.len(), "pending invalidation ceiling reached, flushed");
        }
        keys.len()
    }

    /// Drops every pending timer without invalidating anything.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
        self.set_pending_count(0);
    }

    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count > 0
    }

    pub fn pending(
        &self,
        key: &QueryKey,
    ) -> Option<&PendingInvalidation> {
        self.pending.get(key)
    }

    fn cancel(
        &mut self,
        key: &QueryKey,
    ) {
        if let Some(previous) = self.pending.remove(key) {
            self.queue.remove(&previous.handle);
            self.set_pending_count(self.pending_count.saturating_sub(1));
        }
    }

    fn set_pending_count(
        &mut self,
        count: usize,
    ) {
        self.pending_gauge.add(count as i64 - self.pending_count as i64);
        self.pending_count = count;
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.set_pending_count(0);
    }
}
