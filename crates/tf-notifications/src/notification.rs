//! Notification model and storage

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use tf_core::traits::Id;

/// Notification errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(Id),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

/// What the notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// A task was assigned to the recipient
    TaskAssigned,
    /// An assignee submitted a task for the recipient's review
    SubmittedForReview,
    /// The recipient's submitted task was accepted
    ReviewAccepted,
    /// The recipient's submitted task was rejected
    ReviewRejected,
    /// The recipient's submitted task needs improvement
    NeedsImprovement,
    /// The assignment engine bound a backlog task to the recipient
    BacklogAssigned,
}

/// A durably recorded notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Option<Id>,

    pub recipient_id: Id,

    pub title: String,

    pub message: String,

    pub category: NotificationCategory,

    /// The task this notification is about, where there is one
    pub task_id: Option<Id>,

    pub read_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: Id,
        title: impl Into<String>,
        message: impl Into<String>,
        category: NotificationCategory,
        task_id: Option<Id>,
    ) -> Self {
        Self {
            id: None,
            recipient_id,
            title: title.into(),
            message: message.into(),
            category,
            task_id,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    pub fn mark_read(&mut self) {
        self.read_at = Some(Utc::now());
    }
}

/// Notification storage trait
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Record a notification, assigning its id
    async fn record(&self, notification: &mut Notification) -> NotificationResult<Id>;

    /// Notifications for a user, newest first
    async fn for_user(
        &self,
        user_id: Id,
        unread_only: bool,
        limit: usize,
    ) -> NotificationResult<Vec<Notification>>;

    /// Mark all of a user's notifications read; returns how many changed
    async fn mark_all_read(&self, user_id: Id) -> NotificationResult<usize>;

    /// Unread count for a user
    async fn unread_count(&self, user_id: Id) -> NotificationResult<usize>;
}

/// In-memory notification store for development/testing
pub struct MemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
    next_id: AtomicI64,
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            notifications: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn record(&self, notification: &mut Notification) -> NotificationResult<Id> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        notification.id = Some(id);

        let mut notifications = self.notifications.write().await;
        notifications.push(notification.clone());
        Ok(id)
    }

    async fn for_user(
        &self,
        user_id: Id,
        unread_only: bool,
        limit: usize,
    ) -> NotificationResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == user_id)
            .filter(|n| !unread_only || n.is_unread())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_all_read(&self, user_id: Id) -> NotificationResult<usize> {
        let mut notifications = self.notifications.write().await;
        let mut count = 0;

        for notification in notifications.iter_mut() {
            if notification.recipient_id == user_id && notification.is_unread() {
                notification.mark_read();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn unread_count(&self, user_id: Id) -> NotificationResult<usize> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.recipient_id == user_id && n.is_unread())
            .count())
    }
}
