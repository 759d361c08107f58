//! Performance scoring
//!
//! Ranks a worker against their peers on three normalized dimensions. The
//! weights and rating thresholds are business constants kept for
//! compatibility with historical scores; tune them here, nowhere else.

use serde::{Deserialize, Serialize};
use tf_core::error::Error;
use tf_models::performance::Performance;

pub const WEIGHT_COMPLETED: f64 = 0.4;
pub const WEIGHT_ON_TIME: f64 = 0.3;
pub const WEIGHT_DURATION: f64 = 0.3;

pub const RATING_EXCELLENT: f64 = 0.85;
pub const RATING_GOOD: f64 = 0.70;
pub const RATING_AVERAGE: f64 = 0.50;

/// Qualitative rating derived from the numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl Rating {
    /// Thresholds are evaluated high to low and do not overlap
    pub fn from_score(score: f64) -> Self {
        if score >= RATING_EXCELLENT {
            Rating::Excellent
        } else if score >= RATING_GOOD {
            Rating::Good
        } else if score >= RATING_AVERAGE {
            Rating::Average
        } else {
            Rating::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Average => "Average",
            Rating::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// A scored performance record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    /// Weighted score in `[0, 1]`
    pub score: f64,
    pub rating: Rating,
}

/// Normalize into `[0, 1]` against the peer min/max
///
/// A degenerate range (`max == min`, including single-peer sets) normalizes
/// to 1.0. Preserved for compatibility: a lone worker scores
/// `0.4 + 0.3 * on_time/100` by construction.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        (value - min) / (max - min)
    }
}

/// Score a worker against the peer set for the same period
///
/// The peer set must be non-empty; callers guard this. Durations are taken
/// as absolute values so garbage negative aggregates cannot flip the scale.
pub fn score(peers: &[Performance], target: &Performance) -> Result<PerformanceScore, Error> {
    if peers.is_empty() {
        return Err(Error::precondition("peer set must not be empty"));
    }

    let completed: Vec<f64> = peers.iter().map(|p| p.completed_tasks as f64).collect();
    let durations: Vec<f64> = peers
        .iter()
        .map(|p| p.average_task_duration.abs())
        .collect();

    let min_completed = completed.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_completed = completed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_duration = durations.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_duration = durations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let norm_completed = normalize(
        target.completed_tasks as f64,
        min_completed,
        max_completed,
    );
    let norm_on_time = target.on_time_completion / 100.0;
    let norm_duration = normalize(
        target.average_task_duration.abs(),
        min_duration,
        max_duration,
    );

    // Lower duration is better, so that dimension is inverted
    let score = WEIGHT_COMPLETED * norm_completed
        + WEIGHT_ON_TIME * norm_on_time
        + WEIGHT_DURATION * (1.0 - norm_duration);

    Ok(PerformanceScore {
        score,
        rating: Rating::from_score(score),
    })
}
