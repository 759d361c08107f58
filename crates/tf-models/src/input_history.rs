//! Task input history model and derived progress

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, Timestamped};

/// Base progress tiers by trimmed content length, in characters
const LENGTH_TIERS: [(usize, u8); 4] = [(600, 90), (300, 75), (120, 55), (20, 30)];

/// Granted when the content has two or more paragraphs
const PARAGRAPH_BONUS: u8 = 5;

/// Granted when the content has three or more sentences
const SENTENCE_BONUS: u8 = 5;

/// Append-only snapshot of a worker's free-text progress entry
///
/// The latest entry per task is the current progress and is the source of
/// truth for the submit gate: a task may only be submitted for review when
/// its latest saved snapshot derives to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInputHistory {
    pub id: Option<Id>,

    pub task_id: Id,

    /// The assignee who wrote the entry
    pub user_id: Id,

    /// Free-text progress description
    pub content: String,

    /// Derived progress percentage (0-100)
    pub progress: u8,

    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for TaskInputHistory {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for TaskInputHistory {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Entity for TaskInputHistory {
    const TABLE_NAME: &'static str = "task_input_histories";
    const TYPE_NAME: &'static str = "TaskInputHistory";
}

impl TaskInputHistory {
    /// Build a snapshot, deriving progress from the content
    pub fn snapshot(task_id: Id, user_id: Id, content: impl Into<String>) -> Self {
        let content = content.into();
        let progress = Self::derive_progress(&content);
        Self {
            id: None,
            task_id,
            user_id,
            content,
            progress,
            created_at: None,
        }
    }

    /// Derive a progress percentage from free text
    ///
    /// Length thresholds set the base tier; structural bonuses reward multiple
    /// paragraphs and multiple sentences. The result is informational and
    /// never changes task status by itself.
    pub fn derive_progress(content: &str) -> u8 {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return 0;
        }

        let length = trimmed.chars().count();
        let mut progress = 10;
        for (min_len, tier) in LENGTH_TIERS {
            if length >= min_len {
                progress = tier;
                break;
            }
        }

        let paragraphs = trimmed
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();
        if paragraphs >= 2 {
            progress = progress.saturating_add(PARAGRAPH_BONUS);
        }

        let sentences = trimmed
            .chars()
            .filter(|c| matches!(c, '.' | '!' | '?'))
            .count();
        if sentences >= 3 {
            progress = progress.saturating_add(SENTENCE_BONUS);
        }

        progress.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A report long and structured enough to derive to 100
    pub(crate) fn complete_report() -> String {
        let paragraph = "Implemented the importer and wired it to the staging bucket. \
            Verified row counts against the source extract. \
            Added retries around the flaky upstream endpoint. "
            .repeat(2);
        format!("{paragraph}\n\n{paragraph}")
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(TaskInputHistory::derive_progress(""), 0);
        assert_eq!(TaskInputHistory::derive_progress("   \n  "), 0);
    }

    #[test]
    fn test_length_tiers() {
        assert_eq!(TaskInputHistory::derive_progress("wip"), 10);
        assert_eq!(TaskInputHistory::derive_progress(&"a".repeat(40)), 30);
        assert_eq!(TaskInputHistory::derive_progress(&"a".repeat(150)), 55);
        assert_eq!(TaskInputHistory::derive_progress(&"a".repeat(400)), 75);
        assert_eq!(TaskInputHistory::derive_progress(&"a".repeat(700)), 90);
    }

    #[test]
    fn test_structural_bonuses() {
        let two_paragraphs = format!("{}\n\n{}", "a".repeat(200), "b".repeat(200));
        assert_eq!(TaskInputHistory::derive_progress(&two_paragraphs), 80);

        let sentences = format!("{} one. two. three.", "a".repeat(300));
        assert_eq!(TaskInputHistory::derive_progress(&sentences), 80);
    }

    #[test]
    fn test_full_report_reaches_100() {
        let report = complete_report();
        assert_eq!(TaskInputHistory::derive_progress(&report), 100);
    }

    #[test]
    fn test_snapshot_carries_derived_progress() {
        let entry = TaskInputHistory::snapshot(1, 10, "short note");
        assert_eq!(entry.progress, 10);
        assert_eq!(entry.task_id, 1);
    }
}
