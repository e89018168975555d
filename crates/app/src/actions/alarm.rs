//! Security partition reactions.

use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::activity::ActivityType;
use zonehub_domain::alert::Alert;
use zonehub_domain::device::{ArmMode, DeviceKind};
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;

use super::{Action, ActionError, require_device};
use crate::event_info::EventInfo;

/// Disarm an armed-stay partition when someone moves inside the house.
///
/// Does nothing during the sleep and auto-arm-stay windows, or when the
/// motion sensor does not track security.
pub struct DisarmOnInternalMotion {
    descriptor: ActionDescriptor,
}

impl DisarmOnInternalMotion {
    /// # Errors
    ///
    /// Never fails; the descriptor is static.
    pub fn new() -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("DisarmOnInternalMotion")
            .event(ZoneEvent::Motion)
            .device(DeviceKind::MotionSensor)
            .unique_instance(true)
            .build()?;
        Ok(Self { descriptor })
    }
}

impl Action for DisarmOnInternalMotion {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let zm = event.zone_manager();
        let device = require_device(event)?;
        if !device
            .as_security_aware()
            .is_some_and(|sensor| sensor.is_tracking_security())
        {
            return Ok(false);
        }
        let Some(partition) = zm.security_partition() else {
            tracing::warn!(zone = event.zone().name(), "no security partition configured");
            return Ok(false);
        };
        if partition.arm_mode() != Some(ArmMode::ArmStay) {
            return Ok(false);
        }
        if zm.activity_times_device().is_none() {
            tracing::warn!("no activity times configured, disarming anyway");
        }
        if zm.is_in_activity(ActivityType::SleepTime) || zm.is_in_activity(ActivityType::AutoArmStay) {
            tracing::debug!(zone = event.zone().name(), "motion during sleep or auto-arm time");
            return Ok(false);
        }

        tracing::info!(zone = event.zone().name(), sensor = device.name(), "disarming on internal motion");
        Ok(zm.set_arm_mode(&partition, ArmMode::Unarmed))
    }
}

/// Critical alert when the security partition goes into alarm.
pub struct AlertOnSecurityAlarmTriggered {
    descriptor: ActionDescriptor,
    min_interval: Duration,
}

impl AlertOnSecurityAlarmTriggered {
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(10 * 60);

    /// # Errors
    ///
    /// Never fails; the descriptor is static.
    pub fn new() -> Result<Self, ConfigurationError> {
        let descriptor = ActionDescriptor::builder("AlertOnSecurityAlarmTriggered")
            .event(ZoneEvent::PartitionInAlarm)
            .device(DeviceKind::AlarmPartition)
            .external(true)
            .build()?;
        Ok(Self {
            descriptor,
            min_interval: Self::DEFAULT_MIN_INTERVAL,
        })
    }

    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }
}

impl Action for AlertOnSecurityAlarmTriggered {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let zone = event.zone().name();
        let alert = Alert::critical(format!("[{zone}] Security system is in ALARM"))
            .with_body(format!("The security partition in {zone} has been triggered."))
            .with_category("security-alarm", self.min_interval);
        Ok(event.zone_manager().alert_manager().process_alert(&alert))
    }
}
