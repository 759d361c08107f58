//! Configuration types and loading
//!
//! Configuration is loaded from environment variables with sensible defaults;
//! there is no config-file framework. Each field maps to one `TF_*` variable.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Automatic assignment engine configuration
    pub assignment: AssignmentConfig,

    /// Notification/email configuration
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignmentConfig {
    /// Seconds between automatic sweeps of the backlog
    pub sweep_interval_seconds: u64,

    /// Whether the single-task manual path may fall back to the team lead
    /// when no idle member exists
    pub lead_fallback: bool,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: 300,
            lead_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Whether email delivery is enabled at all
    pub email_enabled: bool,

    /// Maximum delivery attempts per queued email
    pub email_max_retries: u32,

    /// Seconds the outbox worker sleeps between drains
    pub outbox_poll_seconds: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_enabled: false,
            email_max_retries: 3,
            outbox_poll_seconds: 30,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assignment: AssignmentConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("TF_SWEEP_INTERVAL_SECONDS") {
            if let Ok(secs) = secs.parse() {
                config.assignment.sweep_interval_seconds = secs;
            }
        }
        if let Ok(v) = std::env::var("TF_LEAD_FALLBACK") {
            config.assignment.lead_fallback = v == "true" || v == "1";
        }

        if let Ok(v) = std::env::var("TF_EMAIL_ENABLED") {
            config.notifications.email_enabled = v == "true" || v == "1";
        }
        if let Ok(max) = std::env::var("TF_EMAIL_MAX_RETRIES") {
            if let Ok(max) = max.parse() {
                config.notifications.email_max_retries = max;
            }
        }
        if let Ok(secs) = std::env::var("TF_OUTBOX_POLL_SECONDS") {
            if let Ok(secs) = secs.parse() {
                config.notifications.outbox_poll_seconds = secs;
            }
        }

        config
    }
}
