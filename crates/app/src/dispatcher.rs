//! Event dispatch engine.
//!
//! Given an event raised in a zone, the dispatcher resolves the device
//! owning the triggering item, builds one [`EventInfo`] shared by every
//! candidate action, filters the zone's actions by their descriptor and
//! invokes the eligible ones in registration order.
//!
//! A failing action never affects the others: errors and panics are
//! caught per action and logged with the action name, zone and event.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use zonehub_domain::action::SkipReason;
use zonehub_domain::device::{Device, ItemValue};
use zonehub_domain::error::NotFoundError;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::id::DispatchId;
use zonehub_domain::zone::Zone;

use crate::actions::Action;
use crate::event_info::EventInfo;
use crate::zone_manager::ImmutableZoneManager;

/// Errors raised before any action runs.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DispatchError {
    #[error("event {0} requires a triggering item")]
    MissingItem(ZoneEvent),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// Outcome of one dispatch, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Actions invoked, in invocation order (including failed ones).
    pub invoked: Vec<&'static str>,
    /// Actions whose handler returned an error or panicked.
    pub failed: Vec<&'static str>,
    /// Actions skipped by the eligibility filter.
    pub skipped: usize,
}

impl DispatchReport {
    #[must_use]
    pub fn was_invoked(&self, action: &str) -> bool {
        self.invoked.iter().any(|name| *name == action)
    }

    fn merge(&mut self, other: Self) {
        self.invoked.extend(other.invoked);
        self.failed.extend(other.failed);
        self.skipped += other.skipped;
    }
}

/// Handle on the dispatch engine. Cheap to clone.
#[derive(Clone)]
pub struct EventDispatcher {
    zone_manager: Arc<ImmutableZoneManager>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(zone_manager: Arc<ImmutableZoneManager>) -> Self {
        Self { zone_manager }
    }

    #[must_use]
    pub fn zone_manager(&self) -> &Arc<ImmutableZoneManager> {
        &self.zone_manager
    }

    /// Dispatch `event`, raised by `item`, to the actions of `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingItem`] when the event requires an
    /// item and none is given.
    pub fn dispatch(
        &self,
        event: ZoneEvent,
        item: Option<&str>,
        zone: &Arc<Zone>,
    ) -> Result<DispatchReport, DispatchError> {
        self.dispatch_with(event, item, zone, None, serde_json::Value::Null)
    }

    /// Dispatch with an owning zone and a custom parameter.
    ///
    /// The device is looked up in `owning_zone` when given, in `zone`
    /// otherwise. Only the actions of `zone` are candidates.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingItem`] when the event requires an
    /// item and none is given.
    pub fn dispatch_with(
        &self,
        event: ZoneEvent,
        item: Option<&str>,
        zone: &Arc<Zone>,
        owning_zone: Option<&Arc<Zone>>,
        custom_parameter: serde_json::Value,
    ) -> Result<DispatchReport, DispatchError> {
        let mut builder = EventInfo::builder(event, Arc::clone(zone), Arc::clone(&self.zone_manager))
            .custom_parameter(custom_parameter);
        if let Some(item) = item {
            let holder = owning_zone.unwrap_or(zone);
            if let Some(device) = holder.device_by_item(item) {
                builder = builder.device(Arc::clone(device));
            }
            builder = builder.item(item);
        }
        if let Some(owning_zone) = owning_zone {
            builder = builder.owning_zone(Arc::clone(owning_zone));
        }
        let info = builder.build()?;
        Ok(self.run(&info, self.zone_manager.actions_of(zone)))
    }

    /// Apply a raw item change coming from the host and dispatch the
    /// zone event it maps to.
    ///
    /// The change is classified against the previous cached value, then
    /// stored in the device cache. Changes that map to no event (e.g. a
    /// partition arm mode that did not move) are stored only.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotFound`] when no zone holds `item`.
    #[tracing::instrument(skip(self, value), fields(%value))]
    pub fn dispatch_item_change(
        &self,
        item: &str,
        value: ItemValue,
    ) -> Result<DispatchReport, DispatchError> {
        let (zone, device) = self.resolve(item)?;
        let event = ZoneEvent::classify(&device, item, &value);
        device.apply_value(item, value);
        device.record_seen(self.zone_manager.now());

        let Some(event) = event else {
            tracing::trace!(zone = zone.name(), "item change raised no event");
            return Ok(DispatchReport::default());
        };
        if event.is_activation() {
            device.record_activation(self.zone_manager.now());
        }
        self.dispatch(event, Some(item), &zone)
    }

    fn resolve(&self, item: &str) -> Result<(Arc<Zone>, Arc<Device>), DispatchError> {
        let not_found = || NotFoundError {
            entity: "Item",
            id: item.to_string(),
        };
        let zone = self
            .zone_manager
            .zone_containing_item(item)
            .ok_or_else(not_found)?;
        let device = zone.device_by_item(item).cloned().ok_or_else(not_found)?;
        Ok((zone, device))
    }

    /// Send [`ZoneEvent::Startup`] to every action of every zone.
    ///
    /// Must run once, before any other event.
    pub fn broadcast_startup(&self) -> DispatchReport {
        self.broadcast(ZoneEvent::Startup)
    }

    /// Send [`ZoneEvent::Destroy`] to every action of every zone.
    pub fn broadcast_destroy(&self) -> DispatchReport {
        self.broadcast(ZoneEvent::Destroy)
    }

    fn broadcast(&self, event: ZoneEvent) -> DispatchReport {
        let mut report = DispatchReport::default();
        for zone in self.zone_manager.zones() {
            match self.dispatch(event, None, zone) {
                Ok(zone_report) => report.merge(zone_report),
                Err(err) => tracing::warn!(%err, zone = zone.name(), %event, "broadcast failed"),
            }
        }
        tracing::info!(%event, invoked = report.invoked.len(), "broadcast done");
        report
    }

    fn run(&self, info: &EventInfo, actions: &[Arc<dyn Action>]) -> DispatchReport {
        let event = info.event();
        let zone = info.zone();
        let mut report = DispatchReport::default();

        for action in actions {
            let name = action.descriptor().name();
            if let Err(reason) = self.check(action.as_ref(), info) {
                if reason == SkipReason::NoActivityTimes {
                    tracing::warn!(action = name, zone = zone.name(), %event, "{reason}");
                } else {
                    tracing::trace!(action = name, zone = zone.name(), %event, %reason, "action skipped");
                }
                report.skipped += 1;
                continue;
            }

            tracing::debug!(action = name, zone = zone.name(), %event, dispatch = %info.id(), "invoking action");
            report.invoked.push(name);
            match panic::catch_unwind(AssertUnwindSafe(|| action.on_action(info))) {
                Ok(Ok(processed)) => {
                    tracing::trace!(action = name, processed, "action done");
                }
                Ok(Err(err)) => {
                    tracing::error!(%err, action = name, zone = zone.name(), %event, "action failed");
                    report.failed.push(name);
                }
                Err(payload) => {
                    tracing::error!(
                        panic = panic_message(payload.as_ref()),
                        action = name,
                        zone = zone.name(),
                        %event,
                        "action panicked"
                    );
                    report.failed.push(name);
                }
            }
        }
        report
    }

    fn check(&self, action: &dyn Action, info: &EventInfo) -> Result<(), SkipReason> {
        let descriptor = action.descriptor();
        descriptor.check_zone(info.event(), info.zone())?;
        if info.event().is_lifecycle() {
            return Ok(());
        }
        let time = self.zone_manager.clock().local_time();
        self.zone_manager
            .with_activity_times(|times| descriptor.check_activity(times, time))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
