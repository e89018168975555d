//! Device: a capability-tagged wrapper around one or more underlying items.
//!
//! A device is identified by its primary item name. Some kinds carry
//! secondary items (the arm-mode item of an alarm partition, the power
//! reading of a plug). The device caches the last value seen for each of
//! its items together with the time it was last activated; the cache is
//! updated by event delivery and by commands issued through the zone
//! manager.

mod kind;
mod partition;
mod security;
mod value;

pub use kind::DeviceKind;
pub use partition::ArmMode;
pub use security::SecurityAware;
pub use value::ItemValue;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::activity::ActivityTimes;
use crate::error::ConfigurationError;
use crate::time::Timestamp;

/// Power draw (in watts) above which a plug is considered in use.
pub const DEFAULT_PLUG_POWER_THRESHOLD: f64 = 8.0;

/// Kind-specific settings.
#[derive(Debug, Clone, Default)]
pub enum DeviceSettings {
    #[default]
    None,
    Plug {
        power_threshold: f64,
    },
    ActivityTimes(ActivityTimes),
}

#[derive(Debug, Default)]
struct DeviceState {
    values: HashMap<String, ItemValue>,
    last_activated: Option<Timestamp>,
    last_seen: Option<Timestamp>,
    battery_level: Option<u8>,
}

/// A physical or virtual device attached to a zone.
#[derive(Debug)]
pub struct Device {
    kind: DeviceKind,
    item: String,
    secondary_items: Vec<String>,
    battery_item: Option<String>,
    name: Option<String>,
    battery_powered: bool,
    auto_report: bool,
    wifi: bool,
    tracks_security: bool,
    settings: DeviceSettings,
    state: Mutex<DeviceState>,
}

impl Device {
    /// Create a builder for a device of the given kind backed by `item`.
    #[must_use]
    pub fn builder(kind: DeviceKind, item: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder {
            kind,
            item: item.into(),
            ..DeviceBuilder::default()
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Whether this device is of `kind` or one of its descendants.
    #[must_use]
    pub fn is_a(&self, kind: DeviceKind) -> bool {
        self.kind.is_a(kind)
    }

    /// Primary item name; unique within a zone.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    #[must_use]
    pub fn secondary_items(&self) -> &[String] {
        &self.secondary_items
    }

    /// Display name, falling back to the primary item name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.item)
    }

    /// Item reporting the battery level, for battery powered devices.
    #[must_use]
    pub fn battery_item(&self) -> Option<&str> {
        self.battery_item.as_deref()
    }

    /// Whether `item` is the primary, a secondary or the battery item.
    #[must_use]
    pub fn contains_item(&self, item: &str) -> bool {
        self.item == item
            || self.secondary_items.iter().any(|s| s == item)
            || self.battery_item.as_deref() == Some(item)
    }

    #[must_use]
    pub fn is_battery_powered(&self) -> bool {
        self.battery_powered
    }

    /// Whether the device periodically reports its state even when idle.
    #[must_use]
    pub fn is_auto_report(&self) -> bool {
        self.auto_report
    }

    #[must_use]
    pub fn has_wifi(&self) -> bool {
        self.wifi
    }

    pub(crate) fn tracks_security(&self) -> bool {
        self.tracks_security
    }

    #[must_use]
    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// The security view of this device, for kinds that support it.
    #[must_use]
    pub fn as_security_aware(&self) -> Option<&dyn SecurityAware> {
        self.kind
            .is_security_aware()
            .then_some(self as &dyn SecurityAware)
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last known value of the primary item.
    #[must_use]
    pub fn value(&self) -> ItemValue {
        self.value_of(&self.item).unwrap_or_default()
    }

    /// Last known value of one of this device's items.
    #[must_use]
    pub fn value_of(&self, item: &str) -> Option<ItemValue> {
        self.state().values.get(item).cloned()
    }

    /// Last known value of the secondary item at `index`.
    #[must_use]
    pub fn secondary_value(&self, index: usize) -> Option<ItemValue> {
        let item = self.secondary_items.get(index)?;
        self.value_of(item)
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.value().is_on()
    }

    /// Numeric reading of the primary item.
    #[must_use]
    pub fn reading(&self) -> Option<f64> {
        self.value().as_f64()
    }

    #[must_use]
    pub fn last_activated(&self) -> Option<Timestamp> {
        self.state().last_activated
    }

    /// When the host last reported any item of the device.
    #[must_use]
    pub fn last_seen(&self) -> Option<Timestamp> {
        self.state().last_seen
    }

    #[must_use]
    pub fn battery_level(&self) -> Option<u8> {
        self.state().battery_level
    }

    pub fn set_battery_level(&self, level: u8) {
        self.state().battery_level = Some(level.min(100));
    }

    /// Store `value` for `item` without touching the activation timestamp.
    ///
    /// A numeric value on the battery item updates the battery level.
    /// Items that do not belong to the device are ignored.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply_value(&self, item: &str, value: ItemValue) {
        if !self.contains_item(item) {
            return;
        }
        let mut state = self.state();
        if self.battery_item.as_deref() == Some(item) {
            if let Some(level) = value.as_f64() {
                state.battery_level = Some(level.clamp(0.0, 100.0) as u8);
            }
        }
        state.values.insert(item.to_string(), value);
    }

    /// Mark the device as having reported at `at`.
    pub fn record_seen(&self, at: Timestamp) {
        self.state().last_seen = Some(at);
    }

    /// Mark the device as activated at `at`.
    pub fn record_activation(&self, at: Timestamp) {
        self.state().last_activated = Some(at);
    }

    /// Whether the device was activated no earlier than `window` before `now`.
    #[must_use]
    pub fn was_recently_activated(&self, now: Timestamp, window: Duration) -> bool {
        let Some(last) = self.last_activated() else {
            return false;
        };
        let window = chrono::TimeDelta::from_std(window).unwrap_or(chrono::TimeDelta::MAX);
        now.signed_duration_since(last) <= window
    }

    /// Kind-specific occupancy predicate.
    ///
    /// - motion sensor / network presence: on, or activated within `window`
    /// - switch family: on and activated within `window`
    /// - plug: power reading above its threshold
    /// - TV: on
    #[must_use]
    pub fn is_occupied(&self, now: Timestamp, window: Duration) -> bool {
        match self.kind {
            DeviceKind::MotionSensor | DeviceKind::NetworkPresence => {
                self.is_on() || self.was_recently_activated(now, window)
            }
            DeviceKind::Plug => self.power_reading().is_some_and(|watts| {
                watts > self.power_threshold().unwrap_or(DEFAULT_PLUG_POWER_THRESHOLD)
            }),
            DeviceKind::Tv => self.is_on(),
            kind if kind.is_a(DeviceKind::Switch) => {
                self.is_on() && self.was_recently_activated(now, window)
            }
            _ => false,
        }
    }

    /// Power draw of a plug, read from its first secondary item.
    #[must_use]
    pub fn power_reading(&self) -> Option<f64> {
        self.secondary_value(0).and_then(|value| value.as_f64())
    }

    #[must_use]
    pub fn power_threshold(&self) -> Option<f64> {
        match &self.settings {
            DeviceSettings::Plug { power_threshold } => Some(*power_threshold),
            _ => None,
        }
    }

    /// Activity windows carried by an `ActivityTimes` device.
    #[must_use]
    pub fn activity_times(&self) -> Option<&ActivityTimes> {
        match &self.settings {
            DeviceSettings::ActivityTimes(times) => Some(times),
            _ => None,
        }
    }

    /// Arm-mode item of an alarm partition.
    #[must_use]
    pub fn arm_mode_item(&self) -> Option<&str> {
        if self.kind != DeviceKind::AlarmPartition {
            return None;
        }
        self.secondary_items.first().map(String::as_str)
    }

    /// Current arm mode of an alarm partition.
    #[must_use]
    pub fn arm_mode(&self) -> Option<ArmMode> {
        let item = self.arm_mode_item()?;
        ArmMode::from_value(&self.value_of(item)?)
    }

    /// Whether an alarm partition is currently in alarm.
    #[must_use]
    pub fn is_in_alarm(&self) -> bool {
        self.kind == DeviceKind::AlarmPartition && self.is_on()
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug)]
pub struct DeviceBuilder {
    kind: DeviceKind,
    item: String,
    secondary_items: Vec<String>,
    battery_item: Option<String>,
    name: Option<String>,
    battery_powered: bool,
    auto_report: bool,
    wifi: bool,
    tracks_security: bool,
    settings: DeviceSettings,
    initial: Vec<(String, ItemValue)>,
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Switch,
            item: String::new(),
            secondary_items: Vec::new(),
            battery_item: None,
            name: None,
            battery_powered: false,
            auto_report: false,
            wifi: false,
            tracks_security: true,
            settings: DeviceSettings::None,
            initial: Vec::new(),
        }
    }
}

impl DeviceBuilder {
    #[must_use]
    pub fn secondary_item(mut self, item: impl Into<String>) -> Self {
        self.secondary_items.push(item.into());
        self
    }

    /// Item reporting the battery level; implies a battery powered device.
    #[must_use]
    pub fn battery_item(mut self, item: impl Into<String>) -> Self {
        self.battery_item = Some(item.into());
        self.battery_powered = true;
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn battery_powered(mut self, value: bool) -> Self {
        self.battery_powered = value;
        self
    }

    #[must_use]
    pub fn auto_report(mut self, value: bool) -> Self {
        self.auto_report = value;
        self
    }

    /// Device reaches the host over wifi.
    #[must_use]
    pub fn wifi(mut self, value: bool) -> Self {
        self.wifi = value;
        self
    }

    /// Opt a security-aware device out of (or into) the alarm.
    #[must_use]
    pub fn tracks_security(mut self, value: bool) -> Self {
        self.tracks_security = value;
        self
    }

    #[must_use]
    pub fn power_threshold(mut self, watts: f64) -> Self {
        self.settings = DeviceSettings::Plug {
            power_threshold: watts,
        };
        self
    }

    #[must_use]
    pub fn activity_times(mut self, times: ActivityTimes) -> Self {
        self.settings = DeviceSettings::ActivityTimes(times);
        self
    }

    /// Seed the cached value of one of the device's items.
    #[must_use]
    pub fn initial_value(mut self, item: impl Into<String>, value: ItemValue) -> Self {
        self.initial.push((item.into(), value));
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when:
    /// - the primary item is empty ([`ConfigurationError::EmptyName`])
    /// - an alarm partition has no arm-mode item, or an activity-times
    ///   device has no windows ([`ConfigurationError::MissingParameter`])
    pub fn build(self) -> Result<Device, ConfigurationError> {
        if self.item.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        match self.kind {
            DeviceKind::AlarmPartition if self.secondary_items.is_empty() => {
                return Err(ConfigurationError::MissingParameter("arm_mode_item"));
            }
            DeviceKind::ActivityTimes
                if !matches!(self.settings, DeviceSettings::ActivityTimes(_)) =>
            {
                return Err(ConfigurationError::MissingParameter("activity_times"));
            }
            _ => {}
        }

        let device = Device {
            kind: self.kind,
            item: self.item,
            secondary_items: self.secondary_items,
            battery_item: self.battery_item,
            name: self.name,
            battery_powered: self.battery_powered,
            auto_report: self.auto_report,
            wifi: self.wifi,
            tracks_security: self.tracks_security,
            settings: self.settings,
            state: Mutex::new(DeviceState::default()),
        };
        for (item, value) in self.initial {
            device.apply_value(&item, value);
        }
        Ok(device)
    }
}
