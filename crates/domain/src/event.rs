//! Zone events: the domain events actions react to.

use serde::{Deserialize, Serialize};

use crate::device::{ArmMode, Device, DeviceKind, ItemValue};

/// A domain event raised in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneEvent {
    Motion,
    SwitchTurnedOn,
    SwitchTurnedOff,
    ContactOpen,
    ContactClosed,
    DoorOpen,
    DoorClosed,
    WindowOpen,
    WindowClosed,
    PartitionArmedAway,
    PartitionArmedStay,
    PartitionDisarmedFromAway,
    PartitionDisarmedFromStay,
    PartitionInAlarm,
    TemperatureChanged,
    HumidityChanged,
    GasTriggerStateChanged,
    WaterLeakStateChanged,
    BatteryLevelChanged,
    /// Synthetic event raised by an action's own periodic callback.
    Timer,
    /// Broadcast once to every action at process start.
    Startup,
    /// Broadcast once to every action at shutdown.
    Destroy,
}

impl ZoneEvent {
    /// Whether the event must carry a triggering item.
    #[must_use]
    pub fn requires_item(self) -> bool {
        !self.is_lifecycle() && self != Self::Timer
    }

    /// Whether the event is a process lifecycle broadcast.
    #[must_use]
    pub fn is_lifecycle(self) -> bool {
        matches!(self, Self::Startup | Self::Destroy)
    }

    /// Whether the event marks the triggering device as activated.
    #[must_use]
    pub fn is_activation(self) -> bool {
        matches!(
            self,
            Self::Motion
                | Self::SwitchTurnedOn
                | Self::ContactOpen
                | Self::DoorOpen
                | Self::WindowOpen
        )
    }

    /// Map a raw item change on `device` to a zone event.
    ///
    /// Must be called *before* the new value is applied to the device, as
    /// partition disarm events depend on the previous arm mode. Returns
    /// `None` for changes no action reacts to (motion sensor turning off,
    /// unknown arm mode, …).
    #[must_use]
    pub fn classify(device: &Device, item: &str, value: &ItemValue) -> Option<Self> {
        if device.battery_item() == Some(item) {
            return Some(Self::BatteryLevelChanged);
        }
        if device.arm_mode_item() == Some(item) {
            return match (device.arm_mode(), ArmMode::from_value(value)?) {
                (_, ArmMode::ArmAway) => Some(Self::PartitionArmedAway),
                (_, ArmMode::ArmStay) => Some(Self::PartitionArmedStay),
                (Some(ArmMode::ArmAway), ArmMode::Unarmed) => Some(Self::PartitionDisarmedFromAway),
                (Some(ArmMode::ArmStay), ArmMode::Unarmed) => Some(Self::PartitionDisarmedFromStay),
                (_, ArmMode::Unarmed) => None,
            };
        }
        if item != device.item() {
            return None;
        }

        let kind = device.kind();
        match kind {
            DeviceKind::MotionSensor => value.is_on().then_some(Self::Motion),
            DeviceKind::AlarmPartition => value.is_on().then_some(Self::PartitionInAlarm),
            DeviceKind::TemperatureSensor => Some(Self::TemperatureChanged),
            DeviceKind::HumiditySensor => Some(Self::HumidityChanged),
            DeviceKind::GasSensor => Some(Self::GasTriggerStateChanged),
            DeviceKind::WaterLeakSensor => Some(Self::WaterLeakStateChanged),
            DeviceKind::ActivityTimes => None,
            _ if kind.is_a(DeviceKind::Door) => {
                Some(if value.is_on() { Self::DoorOpen } else { Self::DoorClosed })
            }
            DeviceKind::Window => Some(if value.is_on() {
                Self::WindowOpen
            } else {
                Self::WindowClosed
            }),
            DeviceKind::Contact => Some(if value.is_on() {
                Self::ContactOpen
            } else {
                Self::ContactClosed
            }),
            _ => Some(if value.is_on() {
                Self::SwitchTurnedOn
            } else {
                Self::SwitchTurnedOff
            }),
        }
    }
}

impl std::fmt::Display for ZoneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(kind: DeviceKind, item: &str) -> Device {
        Device::builder(kind, item).build().unwrap()
    }

    #[test]
    fn should_not_require_item_for_timer_and_lifecycle_events() {
        assert!(!ZoneEvent::Timer.requires_item());
        assert!(!ZoneEvent::Startup.requires_item());
        assert!(!ZoneEvent::Destroy.requires_item());
        assert!(ZoneEvent::Motion.requires_item());
    }

    #[test]
    fn should_classify_motion_only_when_turning_on() {
        let sensor = device(DeviceKind::MotionSensor, "Motion");
        assert_eq!(
            ZoneEvent::classify(&sensor, "Motion", &ItemValue::On),
            Some(ZoneEvent::Motion)
        );
        assert_eq!(ZoneEvent::classify(&sensor, "Motion", &ItemValue::Off), None);
    }

    #[test]
    fn should_classify_garage_door_as_door() {
        let door = device(DeviceKind::GarageDoor, "Garage");
        assert_eq!(
            ZoneEvent::classify(&door, "Garage", &ItemValue::Open),
            Some(ZoneEvent::DoorOpen)
        );
        assert_eq!(
            ZoneEvent::classify(&door, "Garage", &ItemValue::Closed),
            Some(ZoneEvent::DoorClosed)
        );
    }

    #[test]
    fn should_classify_dimmer_as_switch() {
        let dimmer = device(DeviceKind::Dimmer, "Dimmer");
        assert_eq!(
            ZoneEvent::classify(&dimmer, "Dimmer", &ItemValue::On),
            Some(ZoneEvent::SwitchTurnedOn)
        );
    }

    #[test]
    fn should_classify_disarm_from_previous_mode() {
        let partition = Device::builder(DeviceKind::AlarmPartition, "Alarm")
            .secondary_item("Alarm_Mode")
            .initial_value("Alarm_Mode", ArmMode::ArmAway.to_value())
            .build()
            .unwrap();
        assert_eq!(
            ZoneEvent::classify(&partition, "Alarm_Mode", &ArmMode::Unarmed.to_value()),
            Some(ZoneEvent::PartitionDisarmedFromAway)
        );
        assert_eq!(
            ZoneEvent::classify(&partition, "Alarm_Mode", &ArmMode::ArmStay.to_value()),
            Some(ZoneEvent::PartitionArmedStay)
        );
        assert_eq!(
            ZoneEvent::classify(&partition, "Alarm", &ItemValue::On),
            Some(ZoneEvent::PartitionInAlarm)
        );
    }

    #[test]
    fn should_classify_battery_item() {
        let sensor = Device::builder(DeviceKind::MotionSensor, "Motion")
            .battery_item("Motion_Battery")
            .build()
            .unwrap();
        assert_eq!(
            ZoneEvent::classify(&sensor, "Motion_Battery", &ItemValue::Number(12.0)),
            Some(ZoneEvent::BatteryLevelChanged)
        );
    }

    #[test]
    fn should_ignore_items_not_owned_by_device() {
        let light = device(DeviceKind::Light, "Light");
        assert_eq!(ZoneEvent::classify(&light, "Elsewhere", &ItemValue::On), None);
    }
}
