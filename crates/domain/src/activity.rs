//! Activity times: named windows of the day (sleep, dinner, auto-arm, …).

use std::collections::HashMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::time::TimeRange;

/// A named daily activity that actions can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Lunch,
    Dinner,
    SleepTime,
    Quiet,
    WakeUp,
    AutoArmStay,
    TurnOffPlugs,
}

/// Configured windows for each [`ActivityType`].
///
/// An activity without windows is never active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityTimes {
    windows: HashMap<ActivityType, Vec<TimeRange>>,
}

impl ActivityTimes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the windows for `activity`, parsed from `HH:MM-HH:MM[, …]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidTimeRange`] if a window is malformed.
    pub fn with(mut self, activity: ActivityType, windows: &str) -> Result<Self, ConfigurationError> {
        let ranges = TimeRange::parse_list(windows)?;
        self.windows.entry(activity).or_default().extend(ranges);
        Ok(self)
    }

    /// Whether `time` is inside one of the windows of `activity`.
    #[must_use]
    pub fn is_active(&self, activity: ActivityType, time: NaiveTime) -> bool {
        self.windows
            .get(&activity)
            .is_some_and(|ranges| ranges.iter().any(|range| range.contains(time)))
    }

    /// Whether `time` is inside a window of any of `activities`.
    #[must_use]
    pub fn is_any_active(&self, activities: &[ActivityType], time: NaiveTime) -> bool {
        activities
            .iter()
            .any(|activity| self.is_active(*activity, time))
    }

    #[must_use]
    pub fn windows(&self, activity: ActivityType) -> &[TimeRange] {
        self.windows.get(&activity).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample() -> ActivityTimes {
        ActivityTimes::new()
            .with(ActivityType::SleepTime, "23:00-07:00")
            .unwrap()
            .with(ActivityType::Dinner, "17:30-19:00")
            .unwrap()
    }

    #[test]
    fn should_report_active_inside_window() {
        let times = sample();
        assert!(times.is_active(ActivityType::SleepTime, at(2, 0)));
        assert!(times.is_active(ActivityType::Dinner, at(18, 0)));
    }

    #[test]
    fn should_report_inactive_outside_window() {
        let times = sample();
        assert!(!times.is_active(ActivityType::SleepTime, at(12, 0)));
    }

    #[test]
    fn should_report_inactive_for_unconfigured_activity() {
        let times = sample();
        assert!(!times.is_active(ActivityType::AutoArmStay, at(2, 0)));
        assert!(times.windows(ActivityType::AutoArmStay).is_empty());
    }

    #[test]
    fn should_match_any_of_several_activities() {
        let times = sample();
        let filter = [ActivityType::Lunch, ActivityType::Dinner];
        assert!(times.is_any_active(&filter, at(18, 30)));
        assert!(!times.is_any_active(&filter, at(21, 0)));
    }

    #[test]
    fn should_accumulate_windows_for_the_same_activity() {
        let times = ActivityTimes::new()
            .with(ActivityType::Quiet, "13:00-14:00")
            .unwrap()
            .with(ActivityType::Quiet, "21:00-22:00")
            .unwrap();
        assert_eq!(times.windows(ActivityType::Quiet).len(), 2);
    }

    #[test]
    fn should_reject_invalid_window() {
        let result = ActivityTimes::new().with(ActivityType::Lunch, "noon");
        assert!(result.is_err());
    }
}
