//! Background flush scheduling
//!
//! A tokio task that runs the executor on a fixed period and whenever the
//! ingestion path signals that the buffer reached its threshold. The task
//! awaits each flush before taking the next trigger; manual flushes from
//! elsewhere are kept apart by the executor's gate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::flush::{FlushExecutor, FlushTrigger};

/// Handle to the running flush task
pub struct FlushScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl FlushScheduler {
    /// Spawn the flush loop on the current runtime
    ///
    /// The first periodic tick fires one full `period` after spawning.
    pub fn spawn(executor: Arc<FlushExecutor>, period: Duration, threshold: Arc<Notify>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(executor, period, threshold, shutdown_rx));

        info!(interval_ms = period.as_millis() as u64, "flush scheduler started");
        Self {
            shutdown_tx,
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the loop and wait for an in-flight flush to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            debug!(error = %e, "flush scheduler task ended abnormally");
        }
        info!("flush scheduler stopped");
    }
}

async fn run(
    executor: Arc<FlushExecutor>,
    period: Duration,
    threshold: Arc<Notify>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = period.max(Duration::from_millis(1));
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let trigger = tokio::select! {
            _ = timer.tick() => FlushTrigger::Periodic,
            _ = threshold.notified() => FlushTrigger::Threshold,
            // only `true` is ever sent; a dropped sender also means stop
            _ = shutdown_rx.changed() => break,
        };

        // failures are logged and recorded by the executor; the restored
        // entries ride along with the next trigger
        if let Err(e) = executor.flush(trigger).await {
            debug!(%trigger, error = %e, "scheduled flush failed");
        }
    }
}
