//! Low battery alert.

use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::alert::Alert;
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;

use super::{Action, ActionError, require_device};
use crate::event_info::EventInfo;

/// Admin warning when a battery-powered device runs low.
pub struct AlertOnLowBatteryLevel {
    descriptor: ActionDescriptor,
    threshold: u8,
}

impl AlertOnLowBatteryLevel {
    pub const DEFAULT_THRESHOLD: u8 = 15;
    const RE_ALERT_INTERVAL: Duration = Duration::from_secs(24 * 3600);

    /// Warn once the battery level drops under `threshold` percent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingParameter`] when `threshold`
    /// is not within `1..=100`.
    pub fn new(threshold: u8) -> Result<Self, ConfigurationError> {
        if threshold == 0 || threshold > 100 {
            return Err(ConfigurationError::MissingParameter("threshold"));
        }
        let descriptor = ActionDescriptor::builder("AlertOnLowBatteryLevel")
            .event(ZoneEvent::BatteryLevelChanged)
            .external(true)
            .build()?;
        Ok(Self {
            descriptor,
            threshold,
        })
    }
}

impl Action for AlertOnLowBatteryLevel {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let device = require_device(event)?;
        let Some(level) = device.battery_level() else {
            return Err(ActionError::MissingValue(
                device.battery_item().unwrap_or(device.item()).to_string(),
            ));
        };
        if level >= self.threshold {
            return Ok(false);
        }
        let zone = event.zone().name();
        let alert = Alert::warning(format!("[{zone}] The {} battery is at {level}%", device.name()))
            .with_body(format!("Replace the battery of {} in {zone}.", device.name()))
            .with_category(format!("battery-{}", device.item()), Self::RE_ALERT_INTERVAL);
        Ok(event.zone_manager().alert_manager().process_admin_alert(&alert))
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
    use zonehub_domain::device::{Device, DeviceKind, ItemValue};
    use zonehub_domain::zone::Zone;

    #[test]
    fn should_send_admin_alert_under_threshold() {
        let owner = Arc::new(RecordingNotifier::default());
        let admin = Arc::new(RecordingNotifier::default());
        let harness = Harness::new(
            AlertManager::new()
                .with_owner_channel(owner.clone())
                .with_admin_channel(admin.clone()),
        );
        let mut manager = ZoneManager::new();
        manager
            .add_zone(
                Zone::builder("Hall")
                    .device(
                        Device::builder(DeviceKind::MotionSensor, "hall_motion")
                            .battery_item("hall_motion_battery")
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .register_action("Hall", AlertOnLowBatteryLevel::new(15).unwrap())
            .unwrap();
        let dispatcher = EventDispatcher::new(manager.build(harness.services()));

        dispatcher
            .dispatch_item_change("hall_motion_battery", ItemValue::Number(40.0))
            .unwrap();
        assert!(admin.subjects().is_empty());

        dispatcher
            .dispatch_item_change("hall_motion_battery", ItemValue::Number(9.0))
            .unwrap();
        assert_eq!(admin.subjects(), vec!["[Hall] The hall_motion battery is at 9%"]);
        assert!(owner.subjects().is_empty());
    }

    #[test]
    fn should_reject_out_of_bounds_threshold() {
        assert!(AlertOnLowBatteryLevel::new(0).is_err());
        assert!(AlertOnLowBatteryLevel::new(101).is_err());
    }
}
