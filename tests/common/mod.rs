use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hotel_realtime::ConnectionState;
use hotel_realtime::HostHandle;
use hotel_realtime::HostSignals;
use hotel_realtime::MemoryChangeFeed;
use hotel_realtime::MessageSink;
use hotel_realtime::NotificationError;
use hotel_realtime::PermissionFlag;
use hotel_realtime::PermissionStore;
use hotel_realtime::QueryCache;
use hotel_realtime::QueryKey;
use hotel_realtime::RealtimeConfig;
use hotel_realtime::RealtimeCoordinator;
use hotel_realtime::RealtimeDeps;
use hotel_realtime::RealtimeStatus;
use hotel_realtime::Result;
use hotel_realtime::SoundCue;
use hotel_realtime::SoundPlayer;
use hotel_realtime::TransientMessage;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for integration test.");
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[derive(Debug, Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<(QueryKey, Instant)>>,
}

impl RecordingCache {
    pub fn keys(&self) -> Vec<QueryKey> {
        self.calls.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn times_of(
        &self,
        key: &QueryKey,
    ) -> Vec<Instant> {
        self.calls
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn tenants(&self) -> Vec<String> {
        let mut tenants: Vec<String> = self.calls.lock().iter().map(|(k, _)| k.tenant_id().to_string()).collect();
        tenants.sort();
        tenants.dedup();
        tenants
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

/// Records every cue; rejects playback when `reject` is set
#[derive(Debug, Default)]
pub struct RecordingSound {
    pub reject: bool,
    pub(crate) played: Mutex<Vec<SoundCue>>,
}

impl RecordingSound {
    pub fn played(&self) -> Vec<SoundCue> {
        self.played.lock().clone()
    }
}

#[async_trait]
impl SoundPlayer for RecordingSound {
    async fn play(
        &self,
        cue: SoundCue,
    ) -> Result<()> {
        self.played.lock().push(cue);
        if self.reject {
            return Err(NotificationError::SoundPlayback("autoplay blocked".to_string()).into());
        }
        Ok(())
    }
}

pub struct TestEnv {
    pub coordinator: RealtimeCoordinator,
    pub feed: MemoryChangeFeed,
    pub cache: Arc<RecordingCache>,
    pub messages: Arc<RecordingMessages>,
    pub sound: Arc<RecordingSound>,
    pub host: HostHandle,
    pub status: watch::Receiver<RealtimeStatus>,
}

impl TestEnv {
    pub fn new(
        config: RealtimeConfig,
        feed: MemoryChangeFeed,
        sound: RecordingSound,
        permission: Arc<dyn PermissionStore>,
    ) -> Self {
        enable_logger();
        let cache = Arc::new(RecordingCache::default());
        let messages = Arc::new(RecordingMessages::default());
        let sound = Arc::new(sound);
        let (signals, host) = HostSignals::channel();

        let deps = RealtimeDeps {
            feed: Arc::new(feed.clone()),
            cache: cache.clone(),
            sound: sound.clone(),
            messages: messages.clone(),
            permission,
        };
        let coordinator = RealtimeCoordinator::new(config, deps, signals).expect("valid config");
        let status = coordinator.status();

        Self {
            coordinator,
            feed,
            cache,
            messages,
            sound,
            host,
            status,
        }
    }

    pub fn default_env() -> Self {
        Self::new(
            RealtimeConfig::default(),
            MemoryChangeFeed::new(),
            RecordingSound::default(),
            Arc::new(PermissionFlag::new(true)),
        )
    }

    pub async fn wait_for_state(
        &mut self,
        state: ConnectionState,
    ) -> RealtimeStatus {
        self.status
            .wait_for(|s| s.state == state)
            .await
            .expect("coordinator alive")
            .clone()
    }
}
