//! Sensor range alerts: temperature and humidity.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::device::DeviceKind;
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::level::Level;
use zonehub_domain::range_alert::{RangeTracking, RangeViolationAlert};

use super::{Action, ActionError, require_device};
use crate::event_info::EventInfo;

const RE_ALERT_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// One tracker per sensor, cloned from a template on its first reading.
struct Trackers {
    template: RangeViolationAlert,
    by_item: Mutex<HashMap<String, RangeViolationAlert>>,
}

impl Trackers {
    fn new(template: RangeViolationAlert) -> Self {
        Self {
            template,
            by_item: Mutex::new(HashMap::new()),
        }
    }

    fn handle(&self, event: &EventInfo, label: &str) -> Result<bool, ActionError> {
        let device = require_device(event)?;
        let reading = device
            .reading()
            .ok_or_else(|| ActionError::MissingValue(device.item().to_string()))?;
        let zone = event.zone().name();

        let alert = {
            let mut by_item = self.by_item.lock().unwrap_or_else(PoisonError::into_inner);
            by_item
                .entry(device.item().to_string())
                .or_insert_with(|| {
                    self.template
                        .clone()
                        .category(format!("{label}-{}", device.item()), RE_ALERT_INTERVAL)
                })
                .update(reading, zone)
        };
        Ok(alert.is_some_and(|alert| event.zone_manager().alert_manager().process_alert(&alert)))
    }
}

/// Warn when a zone temperature leaves its comfort range.
pub struct AlertOnTemperatureOutOfRange {
    descriptor: ActionDescriptor,
    trackers: Trackers,
}

impl AlertOnTemperatureOutOfRange {
    pub const DEFAULT_MIN: f64 = 16.0;
    pub const DEFAULT_MAX: f64 = 30.0;
    pub const DEFAULT_STEP: f64 = 2.0;

    /// Tracker on the default 16°C to 30°C range, re-alerting every 2°C.
    ///
    /// # Errors
    ///
    /// Never fails with the default bounds; see [`with_range`](Self::with_range).
    pub fn new() -> Result<Self, ConfigurationError> {
        Self::with_range(Self::DEFAULT_MIN, Self::DEFAULT_MAX, Self::DEFAULT_STEP)
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the range is empty or inverted,
    /// or when `step` is not positive.
    pub fn with_range(min: f64, max: f64, step: f64) -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("AlertOnTemperatureOutOfRange")
            .event(ZoneEvent::TemperatureChanged)
            .device(DeviceKind::TemperatureSensor)
            .build()?;
        let template = RangeViolationAlert::new("temperature", min, max, step, "°C")?;
        Ok(Self {
            descriptor,
            trackers: Trackers::new(template),
        })
    }
}

impl Action for AlertOnTemperatureOutOfRange {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        self.trackers.handle(event, "temperature")
    }
}

/// Warn when the first-floor humidity drops under its range.
pub struct AlertOnHumidityOutOfRange {
    descriptor: ActionDescriptor,
    trackers: Trackers,
}

impl AlertOnHumidityOutOfRange {
    pub const DEFAULT_MIN: f64 = 35.0;
    pub const DEFAULT_MAX: f64 = 50.0;
    pub const DEFAULT_STEP: f64 = 3.0;

    /// # Errors
    ///
    /// Never fails with the default bounds; see [`with_range`](Self::with_range).
    pub fn new() -> Result<Self, ConfigurationError> {
        Self::with_range(Self::DEFAULT_MIN, Self::DEFAULT_MAX, Self::DEFAULT_STEP)
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the range is empty or inverted,
    /// or when `step` is not positive.
    pub fn with_range(min: f64, max: f64, step: f64) -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("AlertOnHumidityOutOfRange")
            .event(ZoneEvent::HumidityChanged)
            .device(DeviceKind::HumiditySensor)
            .level(Level::FirstFloor)
            .build()?;
        let template = RangeViolationAlert::new("humidity", min, max, step, "%")?
            .tracking(RangeTracking::LowerOnly);
        Ok(Self {
            descriptor,
            trackers: Trackers::new(template),
        })
    }
}

impl Action for AlertOnHumidityOutOfRange {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        self.trackers.handle(event, "humidity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::RecordingNotifier;
    use crate::alert_manager::AlertManager;
    use crate::dispatcher::EventDispatcher;
    use crate::zone_manager::ZoneManager;
    use crate::zone_manager::tests::Harness;
    use std::sync::Arc;
    use zonehub_domain::alert::AlertLevel;
    use zonehub_domain::device::{Device, ItemValue};
    use zonehub_domain::zone::Zone;

    fn setup(level: Level) -> (EventDispatcher, Arc<RecordingNotifier>, Harness) {
        let owner = Arc::new(RecordingNotifier::default());
        let harness = Harness::new(AlertManager::new().with_owner_channel(owner.clone()));
        let mut manager = ZoneManager::new();
        manager
            .add_zone(
                Zone::builder("Office")
                    .level(level)
                    .device(
                        Device::builder(DeviceKind::TemperatureSensor, "office_temperature")
                            .build()
                            .unwrap(),
                    )
                    .device(
                        Device::builder(DeviceKind::TemperatureSensor, "office_desk_temperature")
                            .build()
                            .unwrap(),
                    )
                    .device(
                        Device::builder(DeviceKind::HumiditySensor, "office_humidity")
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .register_action("Office", AlertOnTemperatureOutOfRange::new().unwrap())
            .unwrap()
            .register_action("Office", AlertOnHumidityOutOfRange::new().unwrap())
            .unwrap();
        let dispatcher = EventDispatcher::new(manager.build(harness.services()));
        (dispatcher, owner, harness)
    }

    #[test]
    fn should_alert_on_high_temperature_with_step_backoff() {
        let (dispatcher, owner, _harness) = setup(Level::FirstFloor);
        for reading in [31.0, 32.0, 33.0] {
            dispatcher
                .dispatch_item_change("office_temperature", ItemValue::Number(reading))
                .unwrap();
        }
        assert_eq!(owner.levels(), vec![AlertLevel::Warning]);

        dispatcher
            .dispatch_item_change("office_temperature", ItemValue::Number(22.0))
            .unwrap();
        assert_eq!(owner.levels(), vec![AlertLevel::Warning, AlertLevel::Info]);
    }

    #[test]
    fn should_track_each_sensor_of_a_zone_separately() {
        let (dispatcher, owner, _harness) = setup(Level::FirstFloor);
        for (item, reading) in [
            ("office_temperature", 31.0),
            ("office_desk_temperature", 22.0),
            ("office_temperature", 33.0),
            ("office_desk_temperature", 21.0),
        ] {
            dispatcher
                .dispatch_item_change(item, ItemValue::Number(reading))
                .unwrap();
        }
        assert_eq!(owner.levels(), vec![AlertLevel::Warning]);
    }

    #[test]
    fn should_alert_on_low_humidity_only() {
        let (dispatcher, owner, _harness) = setup(Level::FirstFloor);
        dispatcher
            .dispatch_item_change("office_humidity", ItemValue::Number(70.0))
            .unwrap();
        assert!(owner.levels().is_empty());

        dispatcher
            .dispatch_item_change("office_humidity", ItemValue::Number(30.0))
            .unwrap();
        assert_eq!(owner.levels(), vec![AlertLevel::Warning]);
    }

    #[test]
    fn should_ignore_humidity_outside_first_floor() {
        let (dispatcher, owner, _harness) = setup(Level::SecondFloor);
        let report = dispatcher
            .dispatch_item_change("office_humidity", ItemValue::Number(20.0))
            .unwrap();
        assert!(report.invoked.is_empty());
        assert!(owner.levels().is_empty());
    }

    #[test]
    fn should_fail_on_non_numeric_reading() {
        let (dispatcher, _owner, _harness) = setup(Level::FirstFloor);
        let report = dispatcher
            .dispatch_item_change("office_temperature", ItemValue::Text("n/a".into()))
            .unwrap();
        assert_eq!(report.failed, vec!["AlertOnTemperatureOutOfRange"]);
    }

    #[test]
    fn should_reject_inverted_range() {
        assert!(AlertOnTemperatureOutOfRange::with_range(30.0, 16.0, 2.0).is_err());
    }
}
