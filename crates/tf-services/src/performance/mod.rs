//! Performance aggregation and scoring

pub mod scorer;

pub use scorer::{score, PerformanceScore, Rating};

use std::sync::Arc;

use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::performance::Performance;
use tf_store::{CompletedTaskStore, PerformanceStore, Storage};

use crate::result::ServiceResult;

/// Service maintaining per-user performance aggregates
///
/// Aggregates are derived data: `recompute` rebuilds them from the completed
/// record set and is invoked after every acceptance.
pub struct PerformanceService<S: Storage> {
    store: Arc<S>,
}

impl<S: Storage> PerformanceService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Rebuild a user's aggregate from their completed records
    pub async fn recompute(&self, user_id: Id) -> ServiceResult<Performance> {
        let records = match self.store.completed_for_user(user_id).await {
            Ok(records) => records,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        let mut aggregate = Performance::empty(user_id);
        aggregate.completed_tasks = records.len() as i64;

        let on_time: Vec<bool> = records.iter().filter_map(|r| r.on_time()).collect();
        if !on_time.is_empty() {
            let hits = on_time.iter().filter(|&&b| b).count();
            aggregate.on_time_completion = hits as f64 / on_time.len() as f64 * 100.0;
        }

        let durations: Vec<f64> = records
            .iter()
            .filter_map(|r| r.duration_seconds())
            .map(|d| (d as f64).abs())
            .collect();
        if !durations.is_empty() {
            aggregate.average_task_duration =
                durations.iter().sum::<f64>() / durations.len() as f64;
        }

        match self.store.upsert_performance(aggregate).await {
            Ok(saved) => ServiceResult::success(saved),
            Err(e) => ServiceResult::failure(e.into()),
        }
    }

    /// Score a user against all stored aggregates
    pub async fn score_for(&self, user_id: Id) -> ServiceResult<PerformanceScore> {
        let target = match self.store.find_performance(user_id).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                return ServiceResult::failure(Error::precondition(
                    "no performance aggregate for user; nothing accepted yet",
                ))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        let peers = match self.store.all_performances().await {
            Ok(peers) => peers,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        match score(&peers, &target) {
            Ok(scored) => ServiceResult::success(scored),
            Err(e) => ServiceResult::failure(e),
        }
    }
}
