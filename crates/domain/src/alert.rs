//! Alert: an immutable notification value object.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Severity of an alert. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    #[default]
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Warning => f.write_str("WARNING"),
            Self::Critical => f.write_str("CRITICAL"),
        }
    }
}

/// A notification to deliver to the household owners (or the operator).
///
/// When both `category` and `min_interval` are set the alert manager
/// suppresses repeats of the same category sent within the interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    level: AlertLevel,
    subject: String,
    body: Option<String>,
    category: Option<String>,
    min_interval: Option<Duration>,
}

impl Alert {
    #[must_use]
    pub fn new(level: AlertLevel, subject: impl Into<String>) -> Self {
        Self {
            level,
            subject: subject.into(),
            body: None,
            category: None,
            min_interval: None,
        }
    }

    #[must_use]
    pub fn info(subject: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, subject)
    }

    #[must_use]
    pub fn warning(subject: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, subject)
    }

    #[must_use]
    pub fn critical(subject: impl Into<String>) -> Self {
        Self::new(AlertLevel::Critical, subject)
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a dedup key and the minimum delay between two deliveries
    /// of that key.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>, min_interval: Duration) -> Self {
        self.category = Some(category.into());
        self.min_interval = Some(min_interval);
        self
    }

    #[must_use]
    pub fn level(&self) -> AlertLevel {
        self.level
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Body text, falling back to the subject.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or(&self.subject)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval
    }

    /// The dedup key and interval, present only when both are set.
    #[must_use]
    pub fn dedup_key(&self) -> Option<(&str, Duration)> {
        self.category().zip(self.min_interval)
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.level == AlertLevel::Critical
    }
}
