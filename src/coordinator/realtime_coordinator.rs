use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::pipeline::Pipeline;
use super::pipeline::PipelineCommand;
use super::RealtimeStatus;
use crate::subscribed_tables;
use crate::utils::async_task::spawn_task;
use crate::ChangeFeed;
use crate::HostSignals;
use crate::MessageSink;
use crate::PermissionStore;
use crate::QueryCache;
use crate::RealtimeConfig;
use crate::Result;
use crate::SoundPlayer;
use crate::SubscriptionScope;

/// External collaborators of the pipeline
#[derive(Clone)]
pub struct RealtimeDeps {
    pub feed: Arc<dyn ChangeFeed>,
    pub cache: Arc<dyn QueryCache>,
    pub sound: Arc<dyn SoundPlayer>,
    pub messages: Arc<dyn MessageSink>,
    pub permission: Arc<dyn PermissionStore>,
}

struct RunningPipeline {
    cancel: CancellationToken,
    commands: mpsc::UnboundedSender<PipelineCommand>,
    handle: JoinHandle<()>,
}

/// Owns at most one running pipeline.
///
/// `start`/`stop` must be called from within a tokio runtime.
pub struct RealtimeCoordinator {
    config: Arc<RealtimeConfig>,
    deps: RealtimeDeps,
    host: HostSignals,
    scope: Option<SubscriptionScope>,
    running: Option<RunningPipeline>,
    status_tx: watch::Sender<RealtimeStatus>,
}

impl std::fmt::Debug for RealtimeCoordinator {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RealtimeCoordinator")
            .field("scope", &self.scope)
            .field("running", &self.running.is_some())
            .finish_non_exhaustive()
    }
}

impl RealtimeCoordinator {
    /// Validates `config`; nothing subscribes until [`RealtimeCoordinator::start`].
    pub fn new(
        config: RealtimeConfig,
        deps: RealtimeDeps,
        host: HostSignals,
    ) -> Result<Self> {
        let config = config.validate()?;
        let (status_tx, _) = watch::channel(RealtimeStatus::default());
        Ok(Self {
            config: Arc::new(config),
            deps,
            host,
            scope: None,
            running: None,
            status_tx,
        })
    }

    /// Tears down whatever runs and starts a pipeline for `scope`.
    ///
    /// A role that observes no tables leaves the coordinator idle.
    pub async fn start(
        &mut self,
        scope: SubscriptionScope,
    ) -> Result<()> {
        self.stop().await;

        let tables = subscribed_tables(scope.role(), self.config.subscription.role_filtering);
        if tables.is_empty() {
            if self.config.subscription.verbose {
                debug!(%scope, "no tables for role, staying idle");
            }
            self.status_tx.send_replace(RealtimeStatus::idle(Some(scope.clone())));
            self.scope = Some(scope);
            return Ok(());
        }

        info!(%scope, tables = tables.len(), "starting realtime pipeline");

        let cancel = CancellationToken::new();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let pipeline = Pipeline::new(
            scope.clone(),
            tables,
            self.config.clone(),
            &self.deps,
            self.host.clone(),
            self.status_tx.clone(),
        );
        let handle = spawn_task("realtime-pipeline", pipeline.run(cancel.clone(), commands_rx));

        self.scope = Some(scope);
        self.running = Some(RunningPipeline {
            cancel,
            commands: commands_tx,
            handle,
        });
        Ok(())
    }

    /// Cancels the pipeline and waits until its channel is closed and every
    /// timer is gone. No-op when idle.
    pub async fn stop(&mut self) {
        self.scope = None;
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            if let Err(e) = running.handle.await {
                warn!("realtime pipeline did not shut down cleanly: {:?}", e);
            }
        }
        self.status_tx.send_replace(RealtimeStatus::idle(None));
    }

    /// Follows the session: `None` suspends everything, the running scope is
    /// kept as is, anything else restarts.
    pub async fn update_session(
        &mut self,
        scope: Option<SubscriptionScope>,
    ) -> Result<()> {
        match scope {
            None => {
                self.stop().await;
                Ok(())
            }
            Some(scope) if self.scope.as_ref() == Some(&scope) => Ok(()),
            Some(scope) => self.start(scope).await,
        }
    }

    /// Resubscribes with a fresh retry budget, also from the terminal state.
    ///
    /// Returns false when there is no running pipeline.
    pub fn reconnect(&self) -> bool {
        match &self.running {
            Some(running) => running.commands.send(PipelineCommand::Reconnect).is_ok(),
            None => false,
        }
    }

    pub fn scope(&self) -> Option<&SubscriptionScope> {
        self.scope.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn status(&self) -> watch::Receiver<RealtimeStatus> {
        self.status_tx.subscribe()
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}

impl Drop for RealtimeCoordinator {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}
