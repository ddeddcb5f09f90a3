use std::collections::HashMap;
use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::CoalesceConfig;

/// Per-table coalescing window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescingWindowState {
    pub count: u32,
    pub first_event_at: Instant,
}

/// Suppresses rapid-fire duplicate events per table.
///
/// The first event for a table opens a window; later events inside the
/// window are skipped. Allow-listed tables are never skipped. State lives for
/// the life of one subscription and is never persisted.
#[derive(Debug)]
pub struct EventCoalescer {
    window: Duration,
    allow_list: HashSet<String>,
    windows: HashMap<String, CoalescingWindowState>,
}

impl EventCoalescer {
    pub fn new(config: &CoalesceConfig) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            allow_list: config.allow_list.iter().cloned().collect(),
            windows: HashMap::new(),
        }
    }

    /// Returns true when the event should be merged into the current window.
    pub fn should_skip(
        &mut self,
        table: &str,
        now: Instant,
    ) -> bool {
        if self.allow_list.contains(table) {
            return false;
        }

        match self.windows.get_mut(table) {
            Some(state) if now.saturating_duration_since(state.first_event_at) < self.window => {
                state.count += 1;
                trace!(table, count = state.count, "coalesced event");
                true
            }
            Some(state) => {
                *state = CoalescingWindowState {
                    count: 1,
                    first_event_at: now,
                };
                false
            }
            None => {
                self.windows.insert(
                    table.to_string(),
                    CoalescingWindowState {
                        count: 1,
                        first_event_at: now,
                    },
                );
                false
            }
        }
    }

    pub fn is_allow_listed(
        &self,
        table: &str,
    ) -> bool {
        self.allow_list.contains(table)
    }

    pub fn window_state(
        &self,
        table: &str,
    ) -> Option<CoalescingWindowState> {
        self.windows.get(table).copied()
    }

    pub fn reset(&mut self) {
        self.windows.clear();
    }
}
