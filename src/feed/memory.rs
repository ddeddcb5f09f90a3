use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use super::ChangeFeed;
use super::ChannelRequest;
use super::ChannelState;
use super::FeedChannel;
use super::FeedMessage;
use crate::ChangeEvent;
use crate::EventType;
use crate::Record;
use crate::Result;
use crate::TransportError;

/// In-process change feed.
///
/// Applies listener filters the way the backend does and lets the host drive
/// the channel lifecycle: acknowledge, fail, stall, close.
#[derive(Debug, Clone)]
pub struct MemoryChangeFeed {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    auto_acknowledge: bool,
    unavailable: Option<String>,
    channels: Vec<Slot>,
    requests: Vec<ChannelRequest>,
}

#[derive(Debug)]
struct Slot {
    request: ChannelRequest,
    state: Arc<Mutex<ChannelState>>,
    tx: mpsc::UnboundedSender<FeedMessage>,
}

impl Slot {
    fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    fn set_state(
        &self,
        state: ChannelState,
    ) {
        *self.state.lock() = state;
    }

    fn is_open(&self) -> bool {
        !matches!(self.state(), ChannelState::Closed)
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChangeFeed {
    /// Channels acknowledge their subscription as soon as they open.
    pub fn new() -> Self {
        Self::with_auto_acknowledge(true)
    }

    /// Channels stay `Joining` until [`MemoryChangeFeed::acknowledge`].
    pub fn manual() -> Self {
        Self::with_auto_acknowledge(false)
    }

    fn with_auto_acknowledge(auto_acknowledge: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                auto_acknowledge,
                unavailable: None,
                channels: Vec::new(),
                requests: Vec::new(),
            })),
        }
    }

    /// Makes every later `subscribe` fail until cleared with `None`.
    pub fn set_unavailable(
        &self,
        reason: Option<&str>,
    ) {
        self.inner.lock().unavailable = reason.map(str::to_string);
    }

    /// Delivers `event` to every joined channel with a matching listener.
    /// Returns the number of channels it reached.
    pub fn publish(
        &self,
        event: ChangeEvent,
    ) -> usize {
        let inner = self.inner.lock();
        let mut delivered = 0;
        for slot in inner.channels.iter().filter(|s| s.state() == ChannelState::Joined) {
            let listening = slot.request.listeners.iter().any(|l| {
                l.table == event.table
                    && (l.event == EventType::All || l.event == event.event_type)
                    && row_matches(&event, &l.filter)
            });
            if listening && slot.tx.send(FeedMessage::Change(event.clone())).is_ok() {
                delivered += 1;
            }
        }
        trace!(table = %event.table, delivered, "memory feed published");
        delivered
    }

    /// Delivers `event` to every joined channel, ignoring listeners and row
    /// filters. Simulates a backend whose filter is broader than requested.
    pub fn publish_unfiltered(
        &self,
        event: ChangeEvent,
    ) -> usize {
        let inner = self.inner.lock();
        inner
            .channels
            .iter()
            .filter(|s| s.state() == ChannelState::Joined)
            .filter(|s| s.tx.send(FeedMessage::Change(event.clone())).is_ok())
            .count()
    }

    /// Joins every channel still joining. Returns how many were joined.
    pub fn acknowledge(&self) -> usize {
        let inner = self.inner.lock();
        let mut joined = 0;
        for slot in inner.channels.iter().filter(|s| s.state() == ChannelState::Joining) {
            slot.set_state(ChannelState::Joined);
            let _ = slot.tx.send(FeedMessage::Subscribed);
            joined += 1;
        }
        joined
    }

    /// Errors every open channel.
    pub fn fail(
        &self,
        error: TransportError,
    ) -> usize {
        let inner = self.inner.lock();
        let mut failed = 0;
        for slot in inner.channels.iter().filter(|s| s.is_open()) {
            slot.set_state(ChannelState::Errored);
            let _ = slot.tx.send(FeedMessage::Error(error.clone()));
            failed += 1;
        }
        failed
    }

    /// Server-side close of every open channel.
    pub fn close_all(&self) -> usize {
        let inner = self.inner.lock();
        let mut closed = 0;
        for slot in inner.channels.iter().filter(|s| s.is_open()) {
            slot.set_state(ChannelState::Closed);
            let _ = slot.tx.send(FeedMessage::Closed);
            closed += 1;
        }
        closed
    }

    /// Changes the reported state of every open channel without telling
    /// anyone. Simulates a channel that silently died.
    pub fn set_state(
        &self,
        state: ChannelState,
    ) {
        let inner = self.inner.lock();
        for slot in inner.channels.iter().filter(|s| s.is_open()) {
            slot.set_state(state);
        }
    }

    /// Every subscription request received, oldest first
    pub fn requests(&self) -> Vec<ChannelRequest> {
        self.inner.lock().requests.clone()
    }

    pub fn open_channels(&self) -> usize {
        self.inner.lock().channels.iter().filter(|s| s.is_open()).count()
    }
}

impl ChangeFeed for MemoryChangeFeed {
    fn subscribe(
        &self,
        request: ChannelRequest,
        tx: mpsc::UnboundedSender<FeedMessage>,
    ) -> Result<Box<dyn FeedChannel>> {
        let mut inner = self.inner.lock();
        if let Some(reason) = &inner.unavailable {
            return Err(TransportError::FeedUnavailable(reason.clone()).into());
        }

        inner.channels.retain(|s| s.is_open());

        let state = Arc::new(Mutex::new(ChannelState::Joining));
        if inner.auto_acknowledge {
            *state.lock() = ChannelState::Joined;
            let _ = tx.send(FeedMessage::Subscribed);
        }

        let channel = MemoryChannel {
            name: request.name.clone(),
            state: state.clone(),
        };
        inner.requests.push(request.clone());
        inner.channels.push(Slot { request, state, tx });

        Ok(Box::new(channel))
    }
}

#[derive(Debug)]
pub struct MemoryChannel {
    name: String,
    state: Arc<Mutex<ChannelState>>,
}

impl FeedChannel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    fn close(&self) {
        *self.state.lock() = ChannelState::Closed;
    }
}

/// Evaluates a `column=eq.value` row filter against the event's row.
/// DELETE events are matched on their old row.
fn row_matches(
    event: &ChangeEvent,
    filter: &str,
) -> bool {
    let Some((column, expected)) = filter.split_once("=eq.") else {
        return true;
    };
    let row: Option<&Record> = match event.event_type {
        EventType::Delete => event.old_record.as_ref(),
        _ => event.new_record.as_ref(),
    };
    match row.and_then(|r| r.get(column)) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        _ => false,
    }
}
