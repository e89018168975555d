//! Notifier writing alerts to the log.

use zonehub_app::ports::{Notifier, NotifierError};
use zonehub_domain::alert::{Alert, AlertLevel};

/// Logs every alert through `tracing`, at a level matching its severity.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    channel: String,
}

impl TracingNotifier {
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

impl Notifier for TracingNotifier {
    fn name(&self) -> &str {
        &self.channel
    }

    fn send(&self, alert: &Alert) -> Result<(), NotifierError> {
        let channel = self.channel.as_str();
        match alert.level() {
            AlertLevel::Info => tracing::info!(channel, subject = alert.subject(), body = alert.body(), "alert"),
            AlertLevel::Warning => tracing::warn!(channel, subject = alert.subject(), body = alert.body(), "alert"),
            AlertLevel::Critical => tracing::error!(channel, subject = alert.subject(), body = alert.body(), "alert"),
        }
        Ok(())
    }
}
