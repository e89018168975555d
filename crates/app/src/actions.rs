//! Concrete actions and the [`Action`] contract.
//!
//! Each action carries an [`ActionDescriptor`] built at construction time.
//! The dispatcher only invokes an action when the descriptor accepts the
//! event and the zone.

pub mod alarm;
pub mod battery;
pub mod door;
pub mod hazard;
pub mod inactive;
pub mod lights;
pub mod range;
pub mod security;

pub use alarm::{AlertOnSecurityAlarmTriggered, DisarmOnInternalMotion};
pub use battery::AlertOnLowBatteryLevel;
pub use door::AlertOnExternalDoorLeftOpen;
pub use hazard::{AlertOnHighGasLevel, AlertOnWaterLeak};
pub use inactive::AlertOnInactiveDevices;
pub use lights::{TurnOffAdjacentZones, TurnOnLightsOnMotion};
pub use range::{AlertOnHumidityOutOfRange, AlertOnTemperatureOutOfRange};
pub use security::ArmAfterFrontDoorClosed;

use std::sync::{Arc, Weak};

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::device::Device;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::zone::Zone;

use crate::event_info::EventInfo;
use crate::zone_manager::ImmutableZoneManager;

/// Recovered failure of an action handler.
///
/// Logged by the dispatcher, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The event carries no device although the action needs one.
    #[error("event carries no device")]
    MissingDevice,

    /// The device has no usable value for `item`.
    #[error("no usable value for item `{0}`")]
    MissingValue(String),

    #[error("{0}")]
    Unexpected(String),
}

/// A rule reacting to zone events.
pub trait Action: Send + Sync {
    fn descriptor(&self) -> &ActionDescriptor;

    /// Handle an event. The returned flag tells whether the action did
    /// something; it is only used for logging.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the action could not complete.
    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError>;
}

/// Build a [`ZoneEvent::Timer`] event and hand it to `action` directly,
/// bypassing the eligibility filter. Used from scheduler callbacks.
pub(crate) fn fire_timer(
    action: &dyn Action,
    zone_manager: &Weak<ImmutableZoneManager>,
    zone: &Arc<Zone>,
    device: Option<Arc<Device>>,
) {
    let name = action.descriptor().name();
    let Some(zone_manager) = zone_manager.upgrade() else {
        tracing::debug!(action = name, "zone manager gone, timer ignored");
        return;
    };
    let mut builder = EventInfo::builder(ZoneEvent::Timer, Arc::clone(zone), zone_manager);
    if let Some(device) = device {
        builder = builder.device(device);
    }
    let result = builder
        .build()
        .map_err(|err| ActionError::Unexpected(err.to_string()))
        .and_then(|info| action.on_action(&info));
    if let Err(err) = result {
        tracing::error!(%err, action = name, zone = zone.name(), "timer handler failed");
    }
}

/// The triggering device, or [`ActionError::MissingDevice`].
pub(crate) fn require_device(event: &EventInfo) -> Result<&Arc<Device>, ActionError> {
    event.device().ok_or(ActionError::MissingDevice)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use zonehub_domain::alert::{Alert, AlertLevel};

    use crate::ports::{Notifier, NotifierError};

    /// Notifier keeping every alert it delivers.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) sent: Mutex<Vec<Alert>>,
    }

    impl RecordingNotifier {
        pub(crate) fn levels(&self) -> Vec<AlertLevel> {
            self.sent.lock().unwrap().iter().map(Alert::level).collect()
        }

        pub(crate) fn subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|alert| alert.subject().to_string())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        fn send(&self, alert: &Alert) -> Result<(), NotifierError> {
            self.sent.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }
}
