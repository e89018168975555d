//! Device kind: explicit type tag with a single-parent hierarchy.

use serde::{Deserialize, Serialize};

/// The type tag of a [`Device`](super::Device).
///
/// Kinds form a tree: a `Dimmer` is a `Light`, which is a `Switch`.
/// Requirements expressed against a parent kind are satisfied by every
/// descendant (see [`is_a`](Self::is_a)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Switch,
    Light,
    Dimmer,
    Fan,
    Contact,
    Door,
    GarageDoor,
    Window,
    MotionSensor,
    AlarmPartition,
    ActivityTimes,
    TemperatureSensor,
    HumiditySensor,
    GasSensor,
    WaterLeakSensor,
    NetworkPresence,
    Plug,
    Tv,
}

impl DeviceKind {
    /// The direct parent kind, if any.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Light | Self::Fan => Some(Self::Switch),
            Self::Dimmer => Some(Self::Light),
            Self::Door | Self::Window => Some(Self::Contact),
            Self::GarageDoor => Some(Self::Door),
            _ => None,
        }
    }

    /// Whether `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Whether devices of this kind expose the
    /// [`SecurityAware`](super::SecurityAware) capability.
    #[must_use]
    pub fn is_security_aware(self) -> bool {
        self == Self::MotionSensor || self.is_a(Self::Contact)
    }

    /// Human-readable name, also used for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Light => "light",
            Self::Dimmer => "dimmer",
            Self::Fan => "fan",
            Self::Contact => "contact",
            Self::Door => "door",
            Self::GarageDoor => "garage_door",
            Self::Window => "window",
            Self::MotionSensor => "motion_sensor",
            Self::AlarmPartition => "alarm_partition",
            Self::ActivityTimes => "activity_times",
            Self::TemperatureSensor => "temperature_sensor",
            Self::HumiditySensor => "humidity_sensor",
            Self::GasSensor => "gas_sensor",
            Self::WaterLeakSensor => "water_leak_sensor",
            Self::NetworkPresence => "network_presence",
            Self::Plug => "plug",
            Self::Tv => "tv",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_satisfy_own_kind() {
        assert!(DeviceKind::Light.is_a(DeviceKind::Light));
    }

    #[test]
    fn should_satisfy_ancestor_kinds() {
        assert!(DeviceKind::Dimmer.is_a(DeviceKind::Light));
        assert!(DeviceKind::Dimmer.is_a(DeviceKind::Switch));
        assert!(DeviceKind::GarageDoor.is_a(DeviceKind::Contact));
    }

    #[test]
    fn should_not_satisfy_descendant_or_sibling_kinds() {
        assert!(!DeviceKind::Switch.is_a(DeviceKind::Light));
        assert!(!DeviceKind::Fan.is_a(DeviceKind::Light));
        assert!(!DeviceKind::Window.is_a(DeviceKind::Door));
    }

    #[test]
    fn should_flag_contacts_and_motion_sensors_as_security_aware() {
        assert!(DeviceKind::MotionSensor.is_security_aware());
        assert!(DeviceKind::Window.is_security_aware());
        assert!(DeviceKind::GarageDoor.is_security_aware());
        assert!(!DeviceKind::Light.is_security_aware());
        assert!(!DeviceKind::AlarmPartition.is_security_aware());
    }
}
