//! Realtime Synchronization Error Hierarchy
//!
//! Defines the error types surfaced by the realtime layer, categorized by
//! the collaborator that produced them. Only transport errors ever reach the
//! consuming UI (through `RealtimeStatus::last_error`); the other categories
//! are either configuration problems at startup or isolated per-call failures.

use std::io;

use config::ConfigError;

use crate::ChannelState;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Change-feed transport failures (channel errors, closes, stalls)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Notification side-effect failures. Never propagated into the pipeline.
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// Inbound change events violating the record invariants
    #[error(transparent)]
    InvalidEvent(#[from] EventError),

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Transport-level failures of the multiplexed change-feed channel.
///
/// Cloneable so the last one can be retained in the published status after
/// the reconnect budget is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Channel reported an error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Channel was closed by the remote side
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// Subscribe acknowledgement never arrived
    #[error("Subscribe acknowledgement timed out")]
    SubscribeTimedOut,

    /// Liveness check found a channel that is neither joined nor joining
    #[error("Channel is stale (state: {state:?})")]
    StaleChannel { state: ChannelState },

    /// The feed could not open a channel at all
    #[error("Change feed unavailable: {0}")]
    FeedUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Sound playback rejected by the host
    #[error("Sound playback failed: {0}")]
    SoundPlayback(String),

    /// Persisted permission flag could not be read or written
    #[error("Permission store failure: {0}")]
    Permission(#[from] io::Error),
}

/// Violations of the `ChangeEvent` record invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("{event_type} event on {table} is missing the new record")]
    MissingNewRecord { table: String, event_type: &'static str },

    #[error("{event_type} event on {table} is missing the old record")]
    MissingOldRecord { table: String, event_type: &'static str },

    #[error("Wildcard event type on {table} is only valid for subscription registration")]
    WildcardEvent { table: String },
}
