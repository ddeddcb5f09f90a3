use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::MessageSink;
use crate::QueryCache;
use crate::QueryKey;
use crate::TransientMessage;

/// Query cache fake recording every invalidation with its virtual timestamp
#[derive(Debug, Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<(QueryKey, Instant)>>,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.calls.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn calls(&self) -> Vec<(QueryKey, Instant)> {
        self.calls.lock().clone()
    }

    pub fn count_of(
        &self,
        key: &QueryKey,
    ) -> usize {
        self.calls.lock().iter().filter(|(k, _)| k == key).count()
    }

    pub fn last_at(
        &self,
        key: &QueryKey,
    ) -> Option<Instant> {
        self.calls.lock().iter().rev().find(|(k, _)| k == key).map(|(_, at)| *at)
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

impl QueryCache for RecordingCache {
    fn invalidate(
        &self,
        key: &QueryKey,
    ) {
        self.calls.lock().push((key.clone(), Instant::now()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingMessages {
    shown: Mutex<Vec<TransientMessage>>,
}

impl RecordingMessages {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shown(&self) -> Vec<TransientMessage> {
        self.shown.lock().clone()
    }
}

impl MessageSink for RecordingMessages {
    fn show(
        &self,
        message: TransientMessage,
    ) {
        self.shown.lock().push(message);
    }
}
