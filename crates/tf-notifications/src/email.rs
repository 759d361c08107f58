//! Email outbox
//!
//! Email is asynchronous and best-effort: the core commits its state
//! transition, enqueues a message here, and a background worker delivers it
//! with retry and exponential backoff. Delivery failure never reaches the
//! operation that queued the message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Email errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Sender not configured")]
    NotConfigured,
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

pub type EmailResult<T> = Result<T, EmailError>;

/// An email message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Email delivery trait
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email, returning a provider message id
    async fn send(&self, message: &EmailMessage) -> EmailResult<String>;

    /// Check if the sender is configured
    fn is_configured(&self) -> bool;
}

/// Log-only email sender (for development)
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        tracing::info!(to = %message.to, subject = %message.subject, "email (log only)");
        Ok(format!("log-{}", uuid::Uuid::new_v4()))
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Queued delivery state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Retrying,
    Delivered,
    Dead,
}

/// A queued email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailJob {
    pub id: String,
    pub message: EmailMessage,
    pub status: OutboxStatus,
    pub attempts: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
    /// When the next attempt may run; `None` means immediately
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmailJob {
    pub fn new(message: EmailMessage, max_retries: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message,
            status: OutboxStatus::Pending,
            attempts: 0,
            max_retries,
            last_error: None,
            next_attempt_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, OutboxStatus::Pending | OutboxStatus::Retrying)
            && self.next_attempt_at.map(|at| now >= at).unwrap_or(true)
    }

    fn mark_delivered(&mut self) {
        self.status = OutboxStatus::Delivered;
    }

    fn mark_failed(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.last_error = Some(error.into());
        self.attempts += 1;

        if self.attempts <= self.max_retries {
            self.status = OutboxStatus::Retrying;
            // Exponential backoff: 2^attempts minutes
            let delay = 2_i64.pow(self.attempts) * 60;
            self.next_attempt_at = Some(now + chrono::Duration::seconds(delay));
        } else {
            self.status = OutboxStatus::Dead;
        }
    }
}

/// Best-effort email queue with a polling worker
pub struct EmailOutbox<S: EmailSender> {
    jobs: RwLock<Vec<EmailJob>>,
    sender: S,
    max_retries: u32,
}

impl<S: EmailSender> EmailOutbox<S> {
    pub fn new(sender: S, max_retries: u32) -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
            sender,
            max_retries,
        }
    }

    /// Queue a message for delivery; never fails the caller
    pub async fn enqueue(&self, message: EmailMessage) -> String {
        let job = EmailJob::new(message, self.max_retries);
        let id = job.id.clone();
        self.jobs.write().await.push(job);
        id
    }

    pub async fn job(&self, id: &str) -> Option<EmailJob> {
        self.jobs.read().await.iter().find(|j| j.id == id).cloned()
    }

    /// Attempt delivery of every due job; returns how many were delivered
    pub async fn process_due(&self) -> usize {
        let now = Utc::now();
        let due: Vec<EmailJob> = {
            let jobs = self.jobs.read().await;
            jobs.iter().filter(|j| j.is_due(now)).cloned().collect()
        };

        let mut delivered = 0;
        for mut job in due {
            match self.sender.send(&job.message).await {
                Ok(_) => {
                    job.mark_delivered();
                    delivered += 1;
                }
                Err(e) => {
                    job.mark_failed(e.to_string(), now);
                    if job.status == OutboxStatus::Dead {
                        tracing::warn!(job_id = %job.id, "email job exhausted retries");
                    }
                }
            }

            let mut jobs = self.jobs.write().await;
            if let Some(pos) = jobs.iter().position(|j| j.id == job.id) {
                jobs[pos] = job;
            }
        }

        delivered
    }

    /// Run the worker loop until shutdown is signalled
    pub async fn run(
        &self,
        poll_seconds: u64,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            self.process_due().await;
            tokio::time::sleep(tokio::time::Duration::from_secs(poll_seconds)).await;
        }
    }
}
