//! Background sweep that drops entries too old to serve even as stale data.

use super::store::TtlStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Handle to a running sweep task. Dropping stops the task.
pub struct EvictionHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl EvictionHandle {
    /// Spawn the sweep on the current Tokio runtime.
    ///
    /// The first sweep runs one `interval` after spawning.
    pub fn spawn(store: Arc<TtlStore>, interval: Duration, ceiling: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(sweep_loop(store, interval, ceiling, shutdown_rx));

        Self {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Ask the task to stop after its current sweep.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for EvictionHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn sweep_loop(
    store: Arc<TtlStore>,
    interval: Duration,
    ceiling: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let Some(start) = Instant::now().checked_add(interval) else {
        debug!("Sweep interval out of range, cache sweep disabled");
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
        return;
    };
    let mut ticker = interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = store.evict_stale(ceiling).await;
                if removed > 0 {
                    info!(removed, "Evicted stale cache entries");
                } else {
                    debug!("Cache sweep found nothing to evict");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!("Cache sweep stopping");
                    break;
                }
            }
        }
    }
}
