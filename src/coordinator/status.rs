use crate::ConnectionState;
use crate::SubscriptionScope;
use crate::TransportError;

/// Snapshot of the realtime layer, published on every change.
///
/// The consuming UI decides how to surface staleness; this only reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeStatus {
    pub scope: Option<SubscriptionScope>,
    pub state: ConnectionState,
    pub attempts: u32,
    pub last_error: Option<TransportError>,
    pub pending_invalidations: usize,
    pub subscribed_tables: Vec<String>,
}

impl RealtimeStatus {
    pub fn idle(scope: Option<SubscriptionScope>) -> Self {
        Self {
            scope,
            state: ConnectionState::Idle,
            attempts: 0,
            last_error: None,
            pending_invalidations: 0,
            subscribed_tables: Vec::new(),
        }
    }

    /// Below the automatic-recovery ceiling everything counts as healthy,
    /// reconnects included. Only the terminal state is not.
    pub fn is_healthy(&self) -> bool {
        self.state != ConnectionState::Closed
    }
}

impl Default for RealtimeStatus {
    fn default() -> Self {
        Self::idle(None)
    }
}
