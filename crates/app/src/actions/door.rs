//! Door-left-open watchdog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use zonehub_domain::action::ActionDescriptor;
use zonehub_domain::alert::Alert;
use zonehub_domain::device::DeviceKind;
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::id::TimerId;

use super::{Action, ActionError, fire_timer, require_device};
use crate::event_info::EventInfo;

struct Inner {
    descriptor: ActionDescriptor,
    max_open: Duration,
    timers: Mutex<HashMap<String, TimerId>>,
}

/// Warn when an external door stays open for too long.
///
/// Opening a door starts a one-shot timer keyed by the door item;
/// closing it cancels the timer. When the timer fires and the door is
/// still open a warning is sent.
#[derive(Clone)]
pub struct AlertOnExternalDoorLeftOpen {
    inner: Arc<Inner>,
}

impl AlertOnExternalDoorLeftOpen {
    pub const DEFAULT_MAX_OPEN: Duration = Duration::from_secs(15 * 60);

    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingParameter`] when `max_open` is zero.
    pub fn new(max_open: Duration) -> Result<Self, ConfigurationError> {
        if max_open.is_zero() {
            return Err(ConfigurationError::MissingParameter("max_open"));
        }
        let descriptor = ActionDescriptor::builder("AlertOnExternalDoorLeftOpen")
            .event(ZoneEvent::DoorOpen)
            .event(ZoneEvent::DoorClosed)
            .device(DeviceKind::Door)
            .internal(false)
            .external(true)
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                descriptor,
                max_open,
                timers: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Number of doors currently being watched.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers().len()
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<String, TimerId>> {
        self.inner.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_open(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let door = Arc::clone(require_device(event)?);
        let zm = event.zone_manager();
        let scheduler = zm.scheduler();

        let action = self.clone();
        let weak = Arc::downgrade(zm);
        let zone = Arc::clone(event.zone());
        let item = door.item().to_string();
        let id = scheduler.after(
            self.inner.max_open,
            Box::new(move || fire_timer(&action, &weak, &zone, Some(door))),
        );

        if let Some(stale) = self.timers().insert(item, id) {
            scheduler.cancel(stale);
        }
        Ok(true)
    }

    fn on_close(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let door = require_device(event)?;
        let Some(id) = self.timers().remove(door.item()) else {
            return Ok(false);
        };
        Ok(event.zone_manager().scheduler().cancel(id))
    }

    fn on_timer(&self, event: &EventInfo) -> Result<bool, ActionError> {
        let door = require_device(event)?;
        self.timers().remove(door.item());
        if !door.is_on() {
            return Ok(false);
        }
        let minutes = self.inner.max_open.as_secs() / 60;
        let zone = event.zone().name();
        let alert = Alert::warning(format!("[{zone}] The {} has been open for {minutes} minutes", door.name()))
            .with_body(format!("The {} in {zone} is still open.", door.name()));
        Ok(event.zone_manager().alert_manager().process_alert(&alert))
    }
}

impl Action for AlertOnExternalDoorLeftOpen {
    fn descriptor(&self) -> &ActionDescriptor {
        &self.inner.descriptor
    }

    fn on_action(&self, event: &EventInfo) -> Result<bool, ActionError> {
        match event.event() {
            ZoneEvent::DoorOpen => self.on_open(event),
            ZoneEvent::DoorClosed => self.on_close(event),
            ZoneEvent::Timer => self.on_timer(event),
            _ => Ok(false),
        }
    }
}
