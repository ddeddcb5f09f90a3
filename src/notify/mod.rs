//! Notification side effects for qualifying insert events.
//!
//! Playing a sound and showing a transient message are fire-and-forget: they
//! never block, delay or fail the invalidation pipeline.

mod dispatcher;
mod permission;

pub use dispatcher::*;
pub use permission::*;


use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Audio cues understood by the embedding application's sound player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    HighPriorityChime,
    NewOrder,
    Message,
    StaffAlert,
    Payment,
}

impl SoundCue {
    pub fn cue_id(&self) -> &'static str {
        match self {
            SoundCue::HighPriorityChime => "high-priority-chime",
            SoundCue::NewOrder => "new-order",
            SoundCue::Message => "message",
            SoundCue::StaffAlert => "staff-alert",
            SoundCue::Payment => "payment",
        }
    }
}

/// Short-lived toast shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMessage {
    pub title: String,
    pub description: String,
    pub duration: Duration,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SoundPlayer: Send + Sync + 'static {
    /// Playback may be rejected by the host (autoplay policies, missing
    /// device). Callers swallow the error.
    async fn play(
        &self,
        cue: SoundCue,
    ) -> Result<()>;
}

/// Must return immediately; rendering happens on the host's side.
pub trait MessageSink: Send + Sync + 'static {
    fn show(
        &self,
        message: TransientMessage,
    );
}

/// User opt-in gate for sound and toast notifications.
///
/// Read on every dispatch: the user can revoke it while a channel is open.
#[cfg_attr(test, automock)]
pub trait PermissionStore: Send + Sync + 'static {
    fn notifications_granted(&self) -> bool;
}
