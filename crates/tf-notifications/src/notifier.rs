//! Notifier facade
//!
//! Services fire notifications through this facade. `try_notify` is the
//! best-effort entry point: a failing store is logged as a warning and the
//! caller's operation proceeds.

use std::sync::Arc;

use tf_core::traits::Id;

use crate::notification::{
    Notification, NotificationCategory, NotificationResult, NotificationStore,
};

/// Facade over a notification store
pub struct Notifier<S: NotificationStore> {
    store: Arc<S>,
}

impl<S: NotificationStore> Clone for Notifier<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: NotificationStore> Notifier<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record a notification, propagating failures
    pub async fn notify(
        &self,
        recipient_id: Id,
        title: impl Into<String>,
        message: impl Into<String>,
        category: NotificationCategory,
        task_id: Option<Id>,
    ) -> NotificationResult<Notification> {
        let mut notification = Notification::new(recipient_id, title, message, category, task_id);
        self.store.record(&mut notification).await?;
        Ok(notification)
    }

    /// Record a notification, best-effort
    ///
    /// Failure is logged and swallowed: a side-channel write must never fail
    /// the state transition that triggered it.
    pub async fn try_notify(
        &self,
        recipient_id: Id,
        title: impl Into<String>,
        message: impl Into<String>,
        category: NotificationCategory,
        task_id: Option<Id>,
    ) {
        if let Err(e) = self
            .notify(recipient_id, title, message, category, task_id)
            .await
        {
            tracing::warn!(
                recipient_id,
                ?task_id,
                "notification write failed: {e}"
            );
        }
    }
}
