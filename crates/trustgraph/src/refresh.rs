//! Background refresh of a shared trust store.
//!
//! A refresher task calls [`TrustStore::update_base`] once at startup and
//! then on every interval tick. The task is controlled through a
//! [`RefreshHandle`]: callers can force an immediate refresh or stop it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use trustgraph_source::GraphSource;

use crate::store::TrustStore;

/// Commands accepted by the refresh task.
enum RefreshCommand {
    /// Refresh now; reply once the refresh has finished.
    RefreshNow(oneshot::Sender<()>),
    /// Stop the task.
    Shutdown,
}

/// Spawns refresh tasks.
pub struct Refresher;

impl Refresher {
    /// Start refreshing `store` every `interval`.
    ///
    /// Must be called from within a tokio runtime. The first refresh runs
    /// immediately.
    pub fn spawn<S>(store: Arc<TrustStore<S>>, interval: Duration) -> RefreshHandle
    where
        S: GraphSource + 'static,
    {
        let (tx, mut rx) = mpsc::channel(8);
        let period = interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::debug!(source = %store.source().describe(), ?period, "trust refresher started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        store.update_base().await;
                    }
                    command = rx.recv() => match command {
                        Some(RefreshCommand::RefreshNow(done)) => {
                            store.update_base().await;
                            ticker.reset();
                            let _ = done.send(());
                        }
                        Some(RefreshCommand::Shutdown) | None => break,
                    },
                }
            }

            tracing::debug!("trust refresher stopped");
        });

        RefreshHandle { tx, task }
    }

    /// Start refreshing `store` at its configured interval.
    pub fn spawn_with_config<S>(store: Arc<TrustStore<S>>) -> RefreshHandle
    where
        S: GraphSource + 'static,
    {
        let interval = store.config().refresh_interval;
        Self::spawn(store, interval)
    }
}

/// Control handle for a running refresh task.
///
/// Dropping the handle stops the task after any refresh in progress.
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshCommand>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Run a refresh now and wait for it to finish.
    ///
    /// Returns `false` if the task has already stopped.
    pub async fn refresh_now(&self) -> bool {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(RefreshCommand::RefreshNow(done_tx)).await.is_err() {
            return false;
        }
        done_rx.await.is_ok()
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.tx.send(RefreshCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "trust refresher task failed");
        }
    }
}
