//! Security capability shared by contacts and motion sensors.

use super::{Device, DeviceKind};

/// A device that can participate in the security system.
pub trait SecurityAware {
    /// Whether a change on this device should be considered by the alarm.
    fn is_tracking_security(&self) -> bool;

    /// Whether the device currently reports an intrusion-worthy state
    /// (contact open, motion detected).
    fn is_tripped(&self) -> bool;
}

impl SecurityAware for Device {
    fn is_tracking_security(&self) -> bool {
        self.kind().is_security_aware() && self.tracks_security()
    }

    fn is_tripped(&self) -> bool {
        match self.kind() {
            DeviceKind::MotionSensor => self.is_on(),
            kind if kind.is_a(DeviceKind::Contact) => self.is_on(),
            _ => false,
        }
    }
}
