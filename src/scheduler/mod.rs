//! Background task that periodically runs the follow-up check.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::core::controller::{AppController, NagCycleOutcome};

pub struct NagScheduler;

impl NagScheduler {
    /// Starts polling on the current tokio runtime.
    ///
    /// Ticks never overlap: a slow gateway delays the next tick instead of
    /// starting a second preparation.
    pub fn spawn(controller: AppController, every: Duration) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(every_ms = every.as_millis() as u64, "nag scheduler started");
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match controller.run_nag_cycle().await {
                            Ok(NagCycleOutcome::Staged(id)) => {
                                info!(transaction = %id, "follow-up call staged");
                            }
                            Ok(outcome) => debug!(?outcome, "nag tick"),
                            Err(e) => error!("nag cycle error: {e}"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("nag scheduler stopped");
        });
        SchedulerHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Owning handle for a running [`NagScheduler`]; dropping it aborts the task.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Stops after the tick in progress, if any, completes.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("nag scheduler panicked: {e}");
                }
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
