//! Notifications for TaskForce RS
//!
//! The core decides *when* and *to whom* a notification fires; this crate
//! records it durably and, optionally, mirrors it to email through a
//! best-effort outbox. Neither path may fail the operation that fired it.

pub mod email;
pub mod notification;
pub mod notifier;

pub use notification::{
    MemoryNotificationStore, Notification, NotificationCategory, NotificationStore,
};
pub use notifier::Notifier;
