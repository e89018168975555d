//! Range violation tracker: threshold crossing with step re-alerting.
//!
//! The tracker is fed every new reading of a sensor. It reports an alert
//! the first time the reading leaves `[min, max]`, stays quiet while the
//! reading oscillates within the same step, re-alerts once the reading
//! goes a whole new step further out, and reports a single "back to
//! normal" alert once the reading returns within bounds.
//!
//! After an alert at step `n` (with `n = floor(breach / step)`) the next
//! warning needs the reading to reach step `n + 2`: the step the reading
//! was heading into when it was notified counts as already covered.

use std::time::Duration;

use crate::alert::Alert;
use crate::error::ConfigurationError;

/// Which side(s) of the range raise alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeTracking {
    #[default]
    Both,
    UpperOnly,
    LowerOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Notified {
    side: Side,
    covered_step: u32,
}

/// Stateful threshold tracker for one sensor stream.
#[derive(Debug, Clone)]
pub struct RangeViolationAlert {
    label: String,
    min: f64,
    max: f64,
    step: f64,
    unit: String,
    category: Option<String>,
    min_interval: Duration,
    tracking: RangeTracking,
    notified: Option<Notified>,
}

impl RangeViolationAlert {
    /// Create a tracker for readings labelled `label` (e.g. "temperature").
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidRange`] when `max <= min` and
    /// [`ConfigurationError::MissingParameter`] when `step` is not
    /// strictly positive.
    pub fn new(
        label: impl Into<String>,
        min: f64,
        max: f64,
        step: f64,
        unit: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let label = label.into();
        if max.is_nan() || min.is_nan() || max <= min {
            return Err(ConfigurationError::InvalidRange {
                name: label,
                min,
                max,
            });
        }
        if step.is_nan() || step <= 0.0 {
            return Err(ConfigurationError::MissingParameter("step"));
        }
        Ok(Self {
            label,
            min,
            max,
            step,
            unit: unit.into(),
            category: None,
            min_interval: Duration::ZERO,
            tracking: RangeTracking::Both,
            notified: None,
        })
    }

    #[must_use]
    pub fn tracking(mut self, tracking: RangeTracking) -> Self {
        self.tracking = tracking;
        self
    }

    /// Dedup key and minimum interval attached to every emitted alert.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>, min_interval: Duration) -> Self {
        self.category = Some(category.into());
        self.min_interval = min_interval;
        self
    }

    /// Whether an out-of-range alert is outstanding.
    #[must_use]
    pub fn is_violated(&self) -> bool {
        self.notified.is_some()
    }

    /// Feed a new reading and return the alert to send, if any.
    ///
    /// Non-finite readings are ignored and leave the state untouched.
    pub fn update(&mut self, reading: f64, zone_name: &str) -> Option<Alert> {
        if !reading.is_finite() {
            return None;
        }
        let Some((side, breach)) = self.breach(reading) else {
            return self.notified.take().map(|_| self.back_to_normal(reading, zone_name));
        };

        // Truncation is fine, the breach is finite and positive here.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let step = (breach / self.step).floor() as u32;

        let should_alert = match self.notified {
            Some(previous) if previous.side == side => step > previous.covered_step,
            _ => true,
        };
        if !should_alert {
            return None;
        }
        self.notified = Some(Notified {
            side,
            covered_step: step.saturating_add(1),
        });
        Some(self.violation(side, reading, zone_name))
    }

    fn breach(&self, reading: f64) -> Option<(Side, f64)> {
        let above = reading - self.max;
        let below = self.min - reading;
        match self.tracking {
            RangeTracking::Both | RangeTracking::UpperOnly if above > 0.0 => {
                Some((Side::Above, above))
            }
            RangeTracking::Both | RangeTracking::LowerOnly if below > 0.0 => {
                Some((Side::Below, below))
            }
            _ => None,
        }
    }

    fn violation(&self, side: Side, reading: f64, zone_name: &str) -> Alert {
        let (direction, bound) = match side {
            Side::Above => ("above", self.max),
            Side::Below => ("below", self.min),
        };
        let alert = Alert::warning(format!(
            "[{zone_name}] The {} {reading}{} is {direction} the {bound}{} threshold",
            self.label, self.unit, self.unit
        ))
        .with_body(format!(
            "The {} in {zone_name} is {reading}{}, expected range is {}{} to {}{}.",
            self.label, self.unit, self.min, self.unit, self.max, self.unit
        ));
        self.with_category(alert)
    }

    // Never deduped: it must not be swallowed by the warning it closes.
    fn back_to_normal(&self, reading: f64, zone_name: &str) -> Alert {
        Alert::info(format!(
            "[{zone_name}] The {} {reading}{} is back to normal",
            self.label, self.unit
        ))
    }

    fn with_category(&self, alert: Alert) -> Alert {
        match &self.category {
            Some(category) => alert.with_category(category.clone(), self.min_interval),
            None => alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertLevel;

    fn temperature() -> RangeViolationAlert {
        RangeViolationAlert::new("temperature", 16.0, 30.0, 2.0, "°C")
            .unwrap()
            .tracking(RangeTracking::UpperOnly)
    }

    fn feed(tracker: &mut RangeViolationAlert, readings: &[f64]) -> Vec<Alert> {
        readings
            .iter()
            .filter_map(|reading| tracker.update(*reading, "Office"))
            .collect()
    }

    #[test]
    fn should_alert_once_while_within_first_step() {
        let mut tracker = temperature();
        let alerts = feed(&mut tracker, &[31.0, 32.0, 33.0]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level(), AlertLevel::Warning);
    }

    #[test]
    fn should_re_alert_after_crossing_a_new_step() {
        let mut tracker = temperature();
        feed(&mut tracker, &[31.0, 32.0, 33.0]);
        let alerts = feed(&mut tracker, &[35.0]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level(), AlertLevel::Warning);
    }

    #[test]
    fn should_report_back_to_normal_once_and_reset() {
        let mut tracker = temperature();
        feed(&mut tracker, &[31.0, 35.0]);

        let alerts = feed(&mut tracker, &[28.0, 27.0]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level(), AlertLevel::Info);
        assert!(!tracker.is_violated());

        let alerts = feed(&mut tracker, &[35.0]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level(), AlertLevel::Warning);
    }

    #[test]
    fn should_not_alert_while_within_range() {
        let mut tracker = temperature();
        assert!(feed(&mut tracker, &[16.0, 22.0, 30.0]).is_empty());
    }

    #[test]
    fn should_ignore_lower_bound_when_tracking_upper_only() {
        let mut tracker = temperature();
        assert!(feed(&mut tracker, &[5.0]).is_empty());
    }

    #[test]
    fn should_ignore_upper_bound_when_tracking_lower_only() {
        let mut tracker = RangeViolationAlert::new("humidity", 35.0, 50.0, 3.0, "%")
            .unwrap()
            .tracking(RangeTracking::LowerOnly);
        assert!(feed(&mut tracker, &[80.0]).is_empty());

        let alerts = feed(&mut tracker, &[34.0]);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].subject().contains("below"));
    }

    #[test]
    fn should_alert_again_when_switching_sides() {
        let mut tracker = RangeViolationAlert::new("temperature", 16.0, 30.0, 2.0, "°C").unwrap();
        assert_eq!(feed(&mut tracker, &[31.0]).len(), 1);
        let alerts = feed(&mut tracker, &[10.0]);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].subject().contains("below"));
    }

    #[test]
    fn should_carry_category_on_warnings_only() {
        let mut tracker = temperature().category("temperature-office", Duration::from_secs(300));
        let alerts = feed(&mut tracker, &[31.0, 20.0]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].category(), Some("temperature-office"));
        assert_eq!(alerts[1].category(), None);
    }

    #[test]
    fn should_keep_violation_open_on_non_finite_reading() {
        let mut tracker = temperature();
        assert_eq!(feed(&mut tracker, &[31.0]).len(), 1);

        assert!(feed(&mut tracker, &[f64::NAN, f64::INFINITY, f64::NEG_INFINITY]).is_empty());
        assert!(tracker.is_violated());

        let alerts = feed(&mut tracker, &[28.0]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level(), AlertLevel::Info);
    }

    #[test]
    fn should_saturate_step_for_huge_reading() {
        let mut tracker = temperature();
        assert_eq!(feed(&mut tracker, &[1e12]).len(), 1);
        assert!(feed(&mut tracker, &[1e12, 2e12]).is_empty());
        assert!(tracker.is_violated());
    }

    #[test]
    fn should_reject_inverted_range() {
        let result = RangeViolationAlert::new("temperature", 30.0, 16.0, 2.0, "°C");
        assert!(matches!(result, Err(ConfigurationError::InvalidRange { .. })));
    }

    #[test]
    fn should_reject_non_positive_step() {
        let result = RangeViolationAlert::new("temperature", 16.0, 30.0, 0.0, "°C");
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::MissingParameter("step")
        );
    }
}
