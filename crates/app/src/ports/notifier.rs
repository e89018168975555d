//! Notifier port: one alert transport.

use zonehub_domain::alert::Alert;

/// A transport failed to deliver an alert.
#[derive(Debug, thiserror::Error)]
#[error("notifier `{channel}` failed: {reason}")]
pub struct NotifierError {
    pub channel: String,
    pub reason: String,
}

impl NotifierError {
    #[must_use]
    pub fn new(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            reason: reason.into(),
        }
    }
}

/// Delivers alerts over one channel (push, email, log, …).
///
/// Retries, if any, are the transport's concern.
pub trait Notifier: Send + Sync {
    /// Channel name used in logs (e.g. `"email"`).
    fn name(&self) -> &str;

    /// Deliver `alert`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the transport could not deliver.
    fn send(&self, alert: &Alert) -> Result<(), NotifierError>;
}
