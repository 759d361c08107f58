//! Periodic sweep scheduler
//!
//! Runs the engine's bulk sweep on a fixed interval until shutdown is
//! signalled. A failed sweep is logged and the next tick tries again;
//! pairings committed before a failure stay committed.

use std::sync::Arc;
use std::time::Duration;

use tf_notifications::NotificationStore;
use tf_store::Storage;

use crate::assignment::engine::AssignmentEngine;

/// Interval worker around [`AssignmentEngine::sweep`]
pub struct SweepScheduler<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    engine: Arc<AssignmentEngine<S, N>>,
    interval: Duration,
}

impl<S, N> SweepScheduler<S, N>
where
    S: Storage + 'static,
    N: NotificationStore + 'static,
{
    pub fn new(engine: Arc<AssignmentEngine<S, N>>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run until the shutdown signal flips to `true`
    ///
    /// Sweeps immediately on start, then once per interval.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            let result = self.engine.sweep().await;
            match result.result() {
                Some(report) => {
                    if !report.assignments.is_empty() || report.skipped > 0 {
                        tracing::info!(
                            assigned = report.assignments.len(),
                            skipped = report.skipped,
                            "sweep finished"
                        );
                    }
                }
                None => {
                    if let Some(e) = result.error() {
                        tracing::error!("sweep failed: {e}");
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
