//! Lifecycle and recovery policy of the single subscription channel.
//!
//! ```text
//! Idle -> Subscribing -> Subscribed -> (error) -> Reconnecting -> Subscribing -> ...
//!                                          \-> Closed (recovery disabled or budget spent)
//! ```
//!
//! The supervisor only decides. The pipeline owns the channel and the
//! reconnect timer and acts on the returned [`SupervisorAction`].

use std::fmt;
use std::time::Duration;

use tracing::error;
use tracing::warn;

use crate::metrics::RECONNECT_ATTEMPTS;
use crate::ChannelState;
use crate::ReconnectPolicy;
use crate::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Idle,
    Subscribing,
    Subscribed,
    Reconnecting,
    /// Terminal until a manual reconnect or a new scope
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Subscribing => "subscribing",
            ConnectionState::Subscribed => "subscribed",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconnectState {
    pub attempts: u32,
    pub last_error: Option<TransportError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorAction {
    /// Close the channel and resubscribe after `delay`
    Reconnect { attempt: u32, delay: Duration },
    /// Close the channel and stay closed; `last_error` is kept
    GiveUp,
    /// Nothing to do in the current state
    Ignore,
}

#[derive(Debug)]
pub struct ConnectionSupervisor {
    policy: ReconnectPolicy,
    tenant_id: String,
    state: ConnectionState,
    reconnect: ReconnectState,
}

impl ConnectionSupervisor {
    pub fn new(
        policy: ReconnectPolicy,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            tenant_id: tenant_id.into(),
            state: ConnectionState::Idle,
            reconnect: ReconnectState::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn reconnect_state(&self) -> &ReconnectState {
        &self.reconnect
    }

    pub fn attempts(&self) -> u32 {
        self.reconnect.attempts
    }

    pub fn last_error(&self) -> Option<&TransportError> {
        self.reconnect.last_error.as_ref()
    }

    /// A channel is held from subscribe until error, close or teardown.
    pub fn holds_channel(&self) -> bool {
        matches!(self.state, ConnectionState::Subscribing | ConnectionState::Subscribed)
    }

    pub fn begin_subscribe(&mut self) {
        self.state = ConnectionState::Subscribing;
    }

    pub fn on_subscribed(&mut self) {
        self.state = ConnectionState::Subscribed;
        self.reconnect = ReconnectState::default();
    }

    /// A successfully processed event proves the channel healthy again.
    pub fn on_event_processed(&mut self) {
        self.reconnect.attempts = 0;
    }

    /// Decides how to recover from a channel error or unexpected close.
    ///
    /// Errors while still subscribing count the same as errors after the
    /// acknowledgement, so a channel that never joins still spends the
    /// budget.
    pub fn on_channel_error(
        &mut self,
        err: TransportError,
    ) -> SupervisorAction {
        if !self.holds_channel() {
            return SupervisorAction::Ignore;
        }

        self.reconnect.last_error = Some(err.clone());

        if !self.policy.enabled {
            self.state = ConnectionState::Closed;
            error!(tenant_id = %self.tenant_id, "channel failed and recovery is disabled: {}", err);
            return SupervisorAction::GiveUp;
        }

        if self.reconnect.attempts >= self.policy.max_attempts {
            self.state = ConnectionState::Closed;
            error!(
                tenant_id = %self.tenant_id,
                attempts = self.reconnect.attempts,
                "giving up on channel after repeated failures: {}",
                err
            );
            return SupervisorAction::GiveUp;
        }

        let delay = self.policy.backoff_delay(self.reconnect.attempts);
        self.reconnect.attempts += 1;
        self.state = ConnectionState::Reconnecting;

        RECONNECT_ATTEMPTS.with_label_values(&[self.tenant_id.as_str()]).inc();
        warn!(
            tenant_id = %self.tenant_id,
            attempt = self.reconnect.attempts,
            delay_ms = delay.as_millis() as u64,
            "channel error, scheduling reconnect: {}",
            err
        );

        SupervisorAction::Reconnect {
            attempt: self.reconnect.attempts,
            delay,
        }
    }

    /// Heartbeat probe. A held channel reporting anything but joined or
    /// joining is dead even if it never raised an error.
    pub fn check_liveness(
        &self,
        channel_state: ChannelState,
    ) -> Option<TransportError> {
        if self.holds_channel() && !channel_state.is_live() {
            return Some(TransportError::StaleChannel { state: channel_state });
        }
        None
    }

    /// Back to `Idle` with a fresh budget. Used on teardown and manual
    /// reconnect.
    pub fn reset(&mut self) {
        self.state = ConnectionState::Idle;
        self.reconnect = ReconnectState::default();
    }
}
