//! Gas and water leak alerts.

use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::alert::Alert;
use zonehub_domain::device::DeviceKind;
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;

use super::{Action, ActionError, require_device};
use crate::event_info::EventInfo;

const HAZARD_RE_ALERT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Critical alert when a gas sensor trips, info alert once it clears.
pub struct AlertOnHighGasLevel {
    descriptor: ActionDescriptor,
}

impl AlertOnHighGasLevel {
    /// # Errors
    ///
    /// Never fails; the descriptor is static.
    pub fn new() -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("AlertOnHighGasLevel")
            .event(ZoneEvent::GasTriggerStateChanged)
            .device(DeviceKind::GasSensor)
            .external(true)
            .build()?;
        Ok(Self { descriptor })
    }
}

impl Action for AlertOnHighGasLevel {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let sensor = require_device(event)?;
        let zone = event.zone().name();
        let alert = if sensor.is_on() {
            Alert::critical(format!("[{zone}] The {} is triggered", sensor.name()))
                .with_body(format!("High gas level detected by {} in {zone}.", sensor.name()))
                .with_category(format!("gas-{}", sensor.item()), HAZARD_RE_ALERT_INTERVAL)
        } else {
            Alert::info(format!("[{zone}] The {} is no longer triggered", sensor.name()))
        };
        Ok(event.zone_manager().alert_manager().process_alert(&alert))
    }
}

/// Critical alert when a water leak sensor trips.
pub struct AlertOnWaterLeak {
    descriptor: ActionDescriptor,
}

impl AlertOnWaterLeak {
    /// # Errors
    ///
    /// Never fails; the descriptor is static.
    pub fn new() -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("AlertOnWaterLeak")
            .event(ZoneEvent::WaterLeakStateChanged)
            .device(DeviceKind::WaterLeakSensor)
            .external(true)
            .build()?;
        Ok(Self { descriptor })
    }
}

impl Action for AlertOnWaterLeak {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let sensor = require_device(event)?;
        if !sensor.is_on() {
            return Ok(false);
        }
        let zone = event.zone().name();
        let alert = Alert::critical(format!("[{zone}] Water leak detected"))
            .with_body(format!("The {} in {zone} reports a leak.", sensor.name()))
            .with_category(format!("water-leak-{}", sensor.item()), HAZARD_RE_ALERT_INTERVAL);
        Ok(event.zone_manager().alert_manager().process_alert(&alert))
    }
}
