use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;

use crate::Result;

/// Spawns a long-lived task and logs the error it stops with.
pub(crate) fn spawn_task<F>(
    name: &str,
    task: F,
) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let name = name.to_string();
    tokio::spawn(async move {
        if let Err(e) = task.await {
            error!("spawned task: {name} stopped or encountered an error: {:?}", e);
        }
    })
}

/// Spawns a fire-and-forget side effect. Its failure is logged and dropped;
/// nothing awaits the task.
pub(crate) fn spawn_side_effect<F>(
    name: &'static str,
    task: F,
) where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = task.await {
            debug!("side effect: {name} failed, ignored: {:?}", e);
        }
    });
}
