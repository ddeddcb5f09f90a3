use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::time::interval_at;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tokio::time::Interval;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::RealtimeDeps;
use super::RealtimeStatus;
use crate::critical_query_keys;
use crate::metrics::EVENTS_COALESCED;
use crate::metrics::EVENTS_RECEIVED;
use crate::query_keys_for;
use crate::ChangeEvent;
use crate::ChangeFeed;
use crate::ChannelRequest;
use crate::ConnectionSupervisor;
use crate::DebounceScheduler;
use crate::Error;
use crate::EventCoalescer;
use crate::FeedChannel;
use crate::FeedMessage;
use crate::HostSignals;
use crate::NotificationDispatcher;
use crate::QueryCache;
use crate::RealtimeConfig;
use crate::Result;
use crate::SubscriptionScope;
use crate::SupervisorAction;
use crate::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipelineCommand {
    /// Drop the channel, forget past failures, subscribe again
    Reconnect,
}

/// All state of one active scope, owned by a single task.
///
/// Nothing here is shared: feed messages, timers, host signals and commands
/// are all processed one at a time by [`Pipeline::run`].
pub(crate) struct Pipeline {
    scope: SubscriptionScope,
    tables: &'static [&'static str],
    config: Arc<RealtimeConfig>,

    feed: Arc<dyn ChangeFeed>,
    cache: Arc<dyn QueryCache>,
    host: HostSignals,

    coalescer: EventCoalescer,
    scheduler: DebounceScheduler,
    dispatcher: NotificationDispatcher,
    supervisor: ConnectionSupervisor,

    channel: Option<Box<dyn FeedChannel>>,
    rx: Option<mpsc::UnboundedReceiver<FeedMessage>>,
    /// Set while the current channel waits for its join acknowledgement
    ack_deadline: Option<Instant>,
    reconnect_at: Option<Instant>,
    heartbeat: Interval,

    status_tx: watch::Sender<RealtimeStatus>,
}

impl Pipeline {
    pub(crate) fn new(
        scope: SubscriptionScope,
        tables: &'static [&'static str],
        config: Arc<RealtimeConfig>,
        deps: &RealtimeDeps,
        host: HostSignals,
        status_tx: watch::Sender<RealtimeStatus>,
    ) -> Self {
        let heartbeat_interval = config.reconnect.heartbeat_interval();
        let mut heartbeat = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            coalescer: EventCoalescer::new(&config.coalesce),
            scheduler: DebounceScheduler::new(
                config.debounce.clone(),
                deps.cache.clone(),
                config.subscription.verbose,
            ),
            dispatcher: NotificationDispatcher::new(
                config.notifications.clone(),
                deps.sound.clone(),
                deps.messages.clone(),
                deps.permission.clone(),
            ),
            supervisor: ConnectionSupervisor::new(config.reconnect, scope.tenant_id()),
            feed: deps.feed.clone(),
            cache: deps.cache.clone(),
            host,
            scope,
            tables,
            config,
            channel: None,
            rx: None,
            ack_deadline: None,
            reconnect_at: None,
            heartbeat,
            status_tx,
        }
    }

    pub(crate) async fn run(
        mut self,
        cancel: CancellationToken,
        mut commands: mpsc::UnboundedReceiver<PipelineCommand>,
    ) -> Result<()> {
        self.subscribe();
        self.publish_status();

        loop {
            tokio::select! {
                biased;
                // P0: teardown
                _ = cancel.cancelled() => {
                    debug!(scope = %self.scope, "pipeline cancelled");
                    break;
                }

                // P1: commands from the coordinator
                Some(command) = commands.recv() => {
                    self.handle_command(command);
                }

                // P2: messages of the current channel only
                message = recv_feed(&mut self.rx) => {
                    match message {
                        Some(message) => self.handle_feed_message(message),
                        None => {
                            self.rx = None;
                            self.on_channel_failure(TransportError::ChannelClosed);
                        }
                    }
                }

                // P3: channel never acknowledged its subscription
                _ = sleep_until_deadline(self.ack_deadline) => {
                    self.ack_deadline = None;
                    warn!(scope = %self.scope, "subscribe acknowledgement overdue");
                    self.on_channel_failure(TransportError::SubscribeTimedOut);
                }

                // P4: backoff elapsed
                _ = sleep_until_deadline(self.reconnect_at) => {
                    self.reconnect_at = None;
                    self.subscribe();
                }

                // P5: liveness probe while a channel is held
                _ = self.heartbeat.tick(), if self.channel.is_some() => {
                    self.check_liveness();
                }

                // P6: host came back online
                true = self.host.became_online() => {
                    self.on_network_recovered();
                }

                // P7: debounce timers
                Some(key) = self.scheduler.fire_next(), if self.scheduler.has_pending() => {
                    trace!(%key, "debounced invalidation delivered");
                }
            }

            self.publish_status();
        }

        self.teardown();
        Ok(())
    }

    fn handle_command(
        &mut self,
        command: PipelineCommand,
    ) {
        match command {
            PipelineCommand::Reconnect => {
                info!(scope = %self.scope, "manual reconnect requested");
                self.reconnect_at = None;
                self.close_channel();
                self.supervisor.reset();
                self.subscribe();
            }
        }
    }

    fn handle_feed_message(
        &mut self,
        message: FeedMessage,
    ) {
        match message {
            FeedMessage::Subscribed => {
                info!(scope = %self.scope, tables = self.tables.len(), "channel subscribed");
                self.ack_deadline = None;
                self.supervisor.on_subscribed();
            }
            FeedMessage::Change(event) => self.handle_change(event),
            FeedMessage::Error(err) => self.on_channel_failure(err),
            FeedMessage::Closed => self.on_channel_failure(TransportError::ChannelClosed),
        }
    }

    /// Coalescer, then notification side channel, then scheduler.
    ///
    /// Only valid events for subscribed tables count: they alone reset the
    /// reconnect budget and label the received counter.
    fn handle_change(
        &mut self,
        event: ChangeEvent,
    ) {
        if let Err(e) = event.validate() {
            warn!(scope = %self.scope, "dropping malformed change event: {}", e);
            return;
        }

        if !self.tables.contains(&event.table.as_str()) {
            trace!(table = %event.table, "ignoring change for unsubscribed table");
            return;
        }

        EVENTS_RECEIVED.with_label_values(&[event.table.as_str()]).inc();
        self.supervisor.on_event_processed();

        if self.coalescer.should_skip(&event.table, Instant::now()) {
            EVENTS_COALESCED.with_label_values(&[event.table.as_str()]).inc();
            trace!(table = %event.table, "change coalesced");
            return;
        }

        self.dispatcher.notify(&event, &self.scope);

        let (keys, tier) = query_keys_for(&event.table, self.scope.tenant_id());
        let delay = tier.delay(&self.config.debounce);
        trace!(
            table = %event.table,
            event_type = %event.event_type,
            ?tier,
            keys = keys.len(),
            "scheduling invalidation"
        );
        self.scheduler.invalidate(&keys, delay, self.host.visibility());
    }

    fn subscribe(&mut self) {
        self.close_channel();

        let (tx, rx) = mpsc::unbounded_channel();
        let request = ChannelRequest::for_scope(&self.scope, self.tables);
        let name = request.name.clone();
        self.supervisor.begin_subscribe();

        match self.feed.subscribe(request, tx) {
            Ok(channel) => {
                debug!(scope = %self.scope, channel = %name, "channel opened");
                self.channel = Some(channel);
                self.rx = Some(rx);
                self.ack_deadline = Some(Instant::now() + self.config.reconnect.subscribe_timeout());
                self.heartbeat.reset();
            }
            Err(e) => {
                let err = match e {
                    Error::Transport(err) => err,
                    other => TransportError::FeedUnavailable(other.to_string()),
                };
                self.on_channel_failure(err);
            }
        }
    }

    fn on_channel_failure(
        &mut self,
        err: TransportError,
    ) {
        match self.supervisor.on_channel_error(err) {
            SupervisorAction::Reconnect { delay, .. } => {
                self.close_channel();
                self.reconnect_at = Some(Instant::now() + delay);
            }
            SupervisorAction::GiveUp => {
                self.close_channel();
                self.reconnect_at = None;
            }
            SupervisorAction::Ignore => {}
        }
    }

    fn check_liveness(&mut self) {
        let Some(channel) = &self.channel else {
            return;
        };
        if let Some(err) = self.supervisor.check_liveness(channel.state()) {
            warn!(scope = %self.scope, "heartbeat found a dead channel: {}", err);
            self.on_channel_failure(err);
        }
    }

    fn on_network_recovered(&mut self) {
        if self.channel.is_none() {
            return;
        }
        let keys = critical_query_keys(self.scope.tenant_id());
        info!(scope = %self.scope, keys = keys.len(), "network recovered, refreshing critical queries");
        for key in &keys {
            self.cache.invalidate(key);
        }
    }

    fn close_channel(&mut self) {
        self.rx = None;
        self.ack_deadline = None;
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
    }

    /// Nothing may fire after this returns.
    fn teardown(&mut self) {
        self.reconnect_at = None;
        self.close_channel();
        self.scheduler.clear();
        self.coalescer.reset();
        self.supervisor.reset();
        debug!(scope = %self.scope, "pipeline torn down");
    }

    fn publish_status(&self) {
        let status = RealtimeStatus {
            scope: Some(self.scope.clone()),
            state: self.supervisor.state(),
            attempts: self.supervisor.attempts(),
            last_error: self.supervisor.last_error().cloned(),
            pending_invalidations: self.scheduler.pending_count(),
            subscribed_tables: self.tables.iter().map(|t| t.to_string()).collect(),
        };
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}

async fn recv_feed(rx: &mut Option<mpsc::UnboundedReceiver<FeedMessage>>) -> Option<FeedMessage> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
