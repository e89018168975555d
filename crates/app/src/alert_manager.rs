//! Alert manager: routes alerts to notification channels.
//!
//! Owner alerts go to every owner channel; admin alerts go to the operator
//! channels only. An alert carrying both a category and a minimum interval
//! is suppressed when the same category was delivered less than that
//! interval ago.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use zonehub_domain::alert::{Alert, AlertLevel};
use zonehub_domain::time::Timestamp;

use crate::clock::SystemClock;
use crate::ports::{Clock, Notifier};

/// Routes [`Alert`]s to notifiers with min-interval suppression.
pub struct AlertManager {
    owners: Vec<Arc<dyn Notifier>>,
    admins: Vec<Arc<dyn Notifier>>,
    owner_min_level: AlertLevel,
    clock: Arc<dyn Clock>,
    last_sent: Mutex<HashMap<String, Timestamp>>,
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertManager {
    /// Create a manager without any channel, on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owners: Vec::new(),
            admins: Vec::new(),
            owner_min_level: AlertLevel::Info,
            clock: Arc::new(SystemClock),
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_owner_channel(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.owners.push(notifier);
        self
    }

    #[must_use]
    pub fn with_admin_channel(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.admins.push(notifier);
        self
    }

    /// Owner alerts below `level` are accepted but not delivered.
    #[must_use]
    pub fn with_owner_min_level(mut self, level: AlertLevel) -> Self {
        self.owner_min_level = level;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deliver an alert to the owners.
    ///
    /// Returns `true` when the alert was delivered or intentionally
    /// suppressed, `false` when a channel failed or none is configured.
    #[tracing::instrument(skip_all, fields(level = %alert.level(), subject = alert.subject()))]
    pub fn process_alert(&self, alert: &Alert) -> bool {
        if alert.level() < self.owner_min_level {
            tracing::debug!(min = %self.owner_min_level, "alert below owner level, dropped");
            return true;
        }
        self.route(alert, &self.owners)
    }

    /// Deliver an operator-only alert, bypassing owner routing.
    #[tracing::instrument(skip_all, fields(level = %alert.level(), subject = alert.subject()))]
    pub fn process_admin_alert(&self, alert: &Alert) -> bool {
        self.route(alert, &self.admins)
    }

    fn route(&self, alert: &Alert, channels: &[Arc<dyn Notifier>]) -> bool {
        let now = self.clock.now();
        let Some(reservation) = self.reserve(alert, now) else {
            tracing::debug!(category = alert.category(), "alert suppressed");
            return true;
        };
        if channels.is_empty() {
            tracing::warn!("no notification channel configured");
            self.release(reservation, now);
            return false;
        }

        let mut delivered = false;
        let mut failed = false;
        for channel in channels {
            match channel.send(alert) {
                Ok(()) => {
                    tracing::info!(channel = channel.name(), "alert delivered");
                    delivered = true;
                }
                Err(err) => {
                    tracing::warn!(%err, channel = channel.name(), "alert delivery failed");
                    failed = true;
                }
            }
        }

        if !delivered {
            self.release(reservation, now);
        }
        !failed
    }

    /// Check suppression and claim the category under a single lock.
    ///
    /// Returns `None` when the alert is suppressed. Otherwise the category
    /// is stamped with `now` before any channel is called, and the
    /// returned [`Reservation`] holds what it replaced.
    fn reserve(&self, alert: &Alert, now: Timestamp) -> Option<Reservation> {
        let Some(category) = alert.category() else {
            return Some(Reservation::default());
        };
        let mut last_sent = self.last_sent.lock().unwrap_or_else(PoisonError::into_inner);
        if let (Some(last), Some((_, min_interval))) = (last_sent.get(category), alert.dedup_key()) {
            let min_interval = chrono::TimeDelta::from_std(min_interval).unwrap_or(chrono::TimeDelta::MAX);
            if now.signed_duration_since(*last) < min_interval {
                return None;
            }
        }
        let previous = last_sent.insert(category.to_string(), now);
        Some(Reservation {
            category: Some(category.to_string()),
            previous,
        })
    }

    /// Undo a reservation after nothing was delivered.
    fn release(&self, reservation: Reservation, now: Timestamp) {
        let Some(category) = reservation.category else {
            return;
        };
        let mut last_sent = self.last_sent.lock().unwrap_or_else(PoisonError::into_inner);
        // Another delivery may have stamped the category since.
        if last_sent.get(&category) != Some(&now) {
            return;
        }
        match reservation.previous {
            Some(previous) => {
                last_sent.insert(category, previous);
            }
            None => {
                last_sent.remove(&category);
            }
        }
    }
}

#[derive(Default)]
struct Reservation {
    category: Option<String>,
    previous: Option<Timestamp>,
}
