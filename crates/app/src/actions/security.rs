//! Auto-arm when leaving through the front door.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::device::{ArmMode, DeviceKind};
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::id::TimerId;

use super::{Action, ActionError, fire_timer};
use crate::event_info::EventInfo;
use crate::zone_manager::ImmutableZoneManager;

const PRESENCE_KINDS: [DeviceKind; 3] = [
    DeviceKind::MotionSensor,
    DeviceKind::NetworkPresence,
    DeviceKind::Tv,
];

struct Inner {
    descriptor: ActionDescriptor,
    check_after: Duration,
    pending: Mutex<Option<TimerId>>,
}

/// Arm away once the front door closes and nobody stays inside.
///
/// Closing the door schedules a check after `check_after`. The check arms
/// the partition when it is still unarmed, every external door is
/// closed, and no internal zone reported presence since the door closed.
/// A new closure restarts the check.
#[derive(Clone)]
pub struct ArmAfterFrontDoorClosed {
    inner: Arc<Inner>,
}

impl ArmAfterFrontDoorClosed {
    pub const DEFAULT_ZONE_PATTERN: &'static str = "Porch";
    pub const DEFAULT_CHECK_AFTER: Duration = Duration::from_secs(5 * 60);

    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the zone name pattern is not a
    /// valid regular expression or `check_after` is zero.
    pub fn new(zone_pattern: &str, check_after: Duration) -> Result<Self, ConfigurationError> {
        if check_after.is_zero() {
            return Err(ConfigurationError::MissingParameter("check_after"));
        }
        let descriptor = ActionDescriptor::builder("ArmAfterFrontDoorClosed")
            .event(ZoneEvent::DoorClosed)
            .device(DeviceKind::Door)
            .internal(false)
            .external(true)
            .zone_name_pattern(zone_pattern)
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                descriptor,
                check_after,
                pending: Mutex::new(None),
            }),
        })
    }

    fn pending(&self) -> MutexGuard<'_, Option<TimerId>> {
        self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_door_closed(&self, event: &EventInfo) -> bool {
        let zm = event.zone_manager();
        let Some(partition) = zm.security_partition() else {
            tracing::warn!(zone = event.zone().name(), "no security partition configured");
            return false;
        };
        if partition.arm_mode() != Some(ArmMode::Unarmed) {
            return false;
        }

        let action = self.clone();
        let weak = Arc::downgrade(zm);
        let zone = Arc::clone(event.zone());
        let id = zm.scheduler().after(
            self.inner.check_after,
            Box::new(move || fire_timer(&action, &weak, &zone, None)),
        );
        if let Some(stale) = self.pending().replace(id) {
            zm.scheduler().cancel(stale);
        }
        true
    }

    fn on_timer(&self, event: &EventInfo) -> bool {
        self.pending().take();
        let zm = event.zone_manager();
        let Some(partition) = zm.security_partition() else {
            return false;
        };
        if partition.arm_mode() != Some(ArmMode::Unarmed) {
            return false;
        }
        if let Some(door) = open_external_door(zm) {
            tracing::info!(door = %door, "external door open, not arming");
            return false;
        }
        if let Some(zone) = occupied_internal_zone(zm, self.inner.check_after) {
            tracing::info!(zone = %zone, "presence detected, not arming");
            return false;
        }
        tracing::info!("house is empty, arming away");
        zm.set_arm_mode(&partition, ArmMode::ArmAway)
    }
}

fn open_external_door(zm: &ImmutableZoneManager) -> Option<String> {
    zm.zones()
        .iter()
        .filter(|zone| zone.is_external())
        .flat_map(|zone| zone.devices_by_kind(DeviceKind::Door))
        .find(|door| door.is_on())
        .map(|door| door.name().to_string())
}

fn occupied_internal_zone(zm: &ImmutableZoneManager, window: Duration) -> Option<String> {
    let now = zm.now();
    zm.zones()
        .iter()
        .filter(|zone| zone.is_internal())
        .find(|zone| zone.is_occupied(&PRESENCE_KINDS, window, now).0)
        .map(|zone| zone.name().to_string())
}

impl Action for ArmAfterFrontDoorClosed {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.inner.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        Ok(match event.event() {
            ZoneEvent::DoorClosed => self.on_door_closed(event),
            ZoneEvent::Timer => self.on_timer(event),
            _ => false,
        })
    }
}
