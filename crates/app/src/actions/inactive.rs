//! Periodic check for auto-report devices that went silent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::alert::Alert;
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::id::TimerId;
use zonehub_domain::time::Timestamp;

use super::{Action, ActionError, fire_timer};
use crate::event_info::EventInfo;

#[derive(Default)]
struct State {
    timer: Option<TimerId>,
    started_at: Option<Timestamp>,
}

struct Inner {
    descriptor: ActionDescriptor,
    check_every: Duration,
    threshold: Duration,
    state: Mutex<State>,
}

/// Admin alert listing auto-report devices silent for longer than a
/// threshold.
///
/// The periodic timer starts on [`ZoneEvent::Startup`] and is cancelled on
/// [`ZoneEvent::Destroy`]. A device never heard from counts as silent
/// since startup.
#[derive(Clone)]
pub struct AlertOnInactiveDevices {
    inner: Arc<Inner>,
}

impl AlertOnInactiveDevices {
    pub const DEFAULT_CHECK_EVERY: Duration = Duration::from_secs(12 * 3600);
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(24 * 3600);

    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingParameter`] when either
    /// duration is zero.
    pub fn new(check_every: Duration, threshold: Duration) -> Result<Self, ConfigurationError> {
        if check_every.is_zero() {
            return Err(ConfigurationError::MissingParameter("check_every"));
        }
        if threshold.is_zero() {
            return Err(ConfigurationError::MissingParameter("threshold"));
        }
        let descriptor = ActionDescriptor::builder("AlertOnInactiveDevices")
            .event(ZoneEvent::Startup)
            .event(ZoneEvent::Destroy)
            .unique_instance(true)
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                descriptor,
                check_every,
                threshold,
                state: Mutex::new(State::default()),
            }),
        })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state().timer.is_some()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&self, event: &EventInfo) -> bool {
        let zm = event.zone_manager();
        let mut state = self.state();
        if state.timer.is_some() {
            return false;
        }
        let action = self.clone();
        let weak = Arc::downgrade(zm);
        let zone = Arc::clone(event.zone());
        state.started_at = Some(zm.now());
        state.timer = Some(zm.scheduler().every(
            self.inner.check_every,
            Box::new(move || fire_timer(&action, &weak, &zone, None)),
        ));
        true
    }

    fn stop(&self, event: &EventInfo) -> bool {
        let Some(id) = self.state().timer.take() else {
            return false;
        };
        event.zone_manager().scheduler().cancel(id)
    }

    fn check(&self, event: &EventInfo) -> bool {
        let zm = event.zone_manager();
        let now = zm.now();
        let Some(started_at) = self.state().started_at else {
            return false;
        };
        let threshold = chrono::TimeDelta::from_std(self.inner.threshold).unwrap_or(chrono::TimeDelta::MAX);

        let silent: Vec<String> = zm
            .zones()
            .iter()
            .flat_map(|zone| zone.devices().iter())
            .filter(|device| device.is_auto_report())
            .filter(|device| {
                let last_seen = device.last_seen().unwrap_or(started_at);
                now.signed_duration_since(last_seen) > threshold
            })
            .map(|device| {
                if device.has_wifi() {
                    format!("{} (wifi)", device.name())
                } else {
                    device.name().to_string()
                }
            })
            .collect();
        if silent.is_empty() {
            return false;
        }

        tracing::info!(count = silent.len(), "inactive devices found");
        let hours = self.inner.threshold.as_secs() / 3600;
        let alert = Alert::warning(format!("{} devices inactive for over {hours} hours", silent.len()))
            .with_body(silent.join(", "));
        zm.alert_manager().process_admin_alert(&alert)
    }
}

impl Action for AlertOnInactiveDevices {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.inner.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        Ok(match event.event() {
            ZoneEvent::Startup => self.start(event),
            ZoneEvent::Destroy => self.stop(event),
            ZoneEvent::Timer => self.check(event),
            _ => false,
        })
    }
}
