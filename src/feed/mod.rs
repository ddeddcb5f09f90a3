//! Change-feed transport seam.
//!
//! The pipeline opens one multiplexed channel per scope through
//! [`ChangeFeed::subscribe`] and receives everything that channel reports as
//! [`FeedMessage`]s on the sender it handed over. Dropping the receiving side
//! is enough to make any late message from that channel unobservable.

mod memory;

pub use memory::*;


use std::fmt;

use nanoid::nanoid;
use tokio::sync::mpsc;

use crate::ChangeEvent;
use crate::EventType;
use crate::Result;
use crate::SubscriptionScope;
use crate::TransportError;

/// Coarse lifecycle state a channel reports synchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    Joining,
    Joined,
    Leaving,
    Closed,
    Errored,
}

impl ChannelState {
    /// Joined or still joining. Anything else is a dead channel.
    pub fn is_live(&self) -> bool {
        matches!(self, ChannelState::Joined | ChannelState::Joining)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            ChannelState::Joining => "joining",
            ChannelState::Joined => "joined",
            ChannelState::Leaving => "leaving",
            ChannelState::Closed => "closed",
            ChannelState::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Everything a channel can report back to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Subscribe acknowledgement
    Subscribed,
    Change(ChangeEvent),
    Error(TransportError),
    /// Server closed the channel
    Closed,
}

/// One per-table listener on the multiplexed channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableListener {
    pub table: String,
    /// Server-side row filter, e.g. `tenant_id=eq.T1`
    pub filter: String,
    pub event: EventType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    pub name: String,
    pub tenant_id: String,
    pub listeners: Vec<TableListener>,
}

impl ChannelRequest {
    /// One listener per table, all events, filtered by the scope's tenant.
    /// Channel names are unique per call so a rebuilt channel never collides
    /// with the one it replaces.
    pub fn for_scope(
        scope: &SubscriptionScope,
        tables: &[&str],
    ) -> Self {
        let filter = scope.tenant_filter();
        Self {
            name: format!("realtime:{}:{}:{}", scope.tenant_id(), scope.role(), nanoid!(8)),
            tenant_id: scope.tenant_id().to_string(),
            listeners: tables
                .iter()
                .map(|table| TableListener {
                    table: table.to_string(),
                    filter: filter.clone(),
                    event: EventType::All,
                })
                .collect(),
        }
    }

    pub fn tables(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.table.as_str()).collect()
    }
}

/// Realtime change-feed client
pub trait ChangeFeed: Send + Sync + 'static {
    /// Opens a channel and returns immediately in the `Joining` state. The
    /// acknowledgement, changes and failures all arrive on `tx`.
    fn subscribe(
        &self,
        request: ChannelRequest,
        tx: mpsc::UnboundedSender<FeedMessage>,
    ) -> Result<Box<dyn FeedChannel>>;
}

/// Handle to one open channel
pub trait FeedChannel: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ChannelState;

    /// Unsubscribes. Idempotent.
    fn close(&self);
}
