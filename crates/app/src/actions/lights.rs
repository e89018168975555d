//! Lighting rules.

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::activity::ActivityType;
use zonehub_domain::device::DeviceKind;
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::neighbor::NeighborType;

use super::{Action, ActionError, require_device};
use crate::event_info::EventInfo;

/// Turn off the lights of open-plan neighbors when a light turns on.
///
/// Only `OpenSpace` and `OpenSpaceSlave` neighbors are affected: turning
/// on a light in a slave zone leaves its master zone alone.
pub struct TurnOffAdjacentZones {
    descriptor: ActionDescriptor,
}

impl TurnOffAdjacentZones {
    /// # Errors
    ///
    /// Never fails; the descriptor is static.
    pub fn new() -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("TurnOffAdjacentZones")
            .event(ZoneEvent::SwitchTurnedOn)
            .device(DeviceKind::Light)
            .build()?;
        Ok(Self { descriptor })
    }
}

impl Action for TurnOffAdjacentZones {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        if !require_device(event)?.is_a(DeviceKind::Light) {
            return Ok(false);
        }
        let zm = event.zone_manager();
        let neighbors = event.zone().neighbor_zones(
            zm.as_ref(),
            &[NeighborType::OpenSpace, NeighborType::OpenSpaceSlave],
        );

        let mut turned_off = false;
        for neighbor in neighbors.iter().filter(|neighbor| neighbor.is_light_on()) {
            for light in neighbor.devices_by_kind(DeviceKind::Light).filter(|light| light.is_on()) {
                tracing::debug!(zone = neighbor.name(), light = light.name(), "turning off adjacent light");
                zm.turn_off(light);
                turned_off = true;
            }
        }
        Ok(turned_off)
    }
}

/// Turn on the zone lights on motion, except during sleep time.
pub struct TurnOnLightsOnMotion {
    descriptor: ActionDescriptor,
}

impl TurnOnLightsOnMotion {
    /// # Errors
    ///
    /// Never fails; the descriptor is static.
    pub fn new() -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("TurnOnLightsOnMotion")
            .event(ZoneEvent::Motion)
            .device(DeviceKind::MotionSensor)
            .device(DeviceKind::Light)
            .build()?;
        Ok(Self { descriptor })
    }
}

impl Action for TurnOnLightsOnMotion {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let zm = event.zone_manager();
        if zm.is_in_activity(ActivityType::SleepTime) {
            return Ok(false);
        }
        let mut turned_on = false;
        for light in event.zone().devices_by_kind(DeviceKind::Light).filter(|light| !light.is_on()) {
            zm.turn_on(light);
            turned_on = true;
        }
        Ok(turned_on)
    }
}
