//! Event context shared by every action invoked for one dispatch.

use std::sync::Arc;

use zonehub_domain::device::Device;
use zonehub_domain::event::ZoneEvent;
use zonehub_domain::id::DispatchId;
use zonehub_domain::time::Timestamp;
use zonehub_domain::zone::Zone;

use crate::dispatcher::DispatchError;
use crate::zone_manager::ImmutableZoneManager;

/// Immutable per-dispatch context.
///
/// Carries an item for every event except [`ZoneEvent::Timer`],
/// [`ZoneEvent::Startup`] and [`ZoneEvent::Destroy`].
#[derive(Clone)]
pub struct EventInfo {
    id: DispatchId,
    event: ZoneEvent,
    item: Option<String>,
    zone: Arc<Zone>,
    owning_zone: Option<Arc<Zone>>,
    zone_manager: Arc<ImmutableZoneManager>,
    device: Option<Arc<Device>>,
    custom_parameter: serde_json::Value,
    timestamp: Timestamp,
}

impl EventInfo {
    #[must_use]
    pub fn builder(
        event: ZoneEvent,
        zone: Arc<Zone>,
        zone_manager: Arc<ImmutableZoneManager>,
    ) -> EventInfoBuilder {
        EventInfoBuilder {
            event,
            item: None,
            zone,
            owning_zone: None,
            zone_manager,
            device: None,
            custom_parameter: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn id(&self) -> DispatchId {
        self.id
    }

    #[must_use]
    pub fn event(&self) -> ZoneEvent {
        self.event
    }

    #[must_use]
    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    /// The zone the event was dispatched to.
    #[must_use]
    pub fn zone(&self) -> &Arc<Zone> {
        &self.zone
    }

    /// The zone actually holding the device, when it differs from [`zone`](Self::zone).
    #[must_use]
    pub fn owning_zone(&self) -> Option<&Arc<Zone>> {
        self.owning_zone.as_ref()
    }

    #[must_use]
    pub fn zone_manager(&self) -> &Arc<ImmutableZoneManager> {
        &self.zone_manager
    }

    #[must_use]
    pub fn device(&self) -> Option<&Arc<Device>> {
        self.device.as_ref()
    }

    #[must_use]
    pub fn custom_parameter(&self) -> &serde_json::Value {
        &self.custom_parameter
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl std::fmt::Debug for EventInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventInfo")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("item", &self.item)
            .field("zone", &self.zone.name())
            .field("owning_zone", &self.owning_zone.as_ref().map(|zone| zone.name()))
            .field("device", &self.device.as_ref().map(|device| device.name()))
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Step-by-step builder for [`EventInfo`].
pub struct EventInfoBuilder {
    event: ZoneEvent,
    item: Option<String>,
    zone: Arc<Zone>,
    owning_zone: Option<Arc<Zone>>,
    zone_manager: Arc<ImmutableZoneManager>,
    device: Option<Arc<Device>>,
    custom_parameter: serde_json::Value,
}

impl EventInfoBuilder {
    #[must_use]
    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    #[must_use]
    pub fn owning_zone(mut self, zone: Arc<Zone>) -> Self {
        self.owning_zone = Some(zone);
        self
    }

    #[must_use]
    pub fn device(mut self, device: Arc<Device>) -> Self {
        self.device = Some(device);
        self
    }

    #[must_use]
    pub fn custom_parameter(mut self, value: serde_json::Value) -> Self {
        self.custom_parameter = value;
        self
    }

    /// Consume the builder and return an [`EventInfo`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingItem`] when the event requires a
    /// triggering item and none was given.
    pub fn build(self) -> Result<EventInfo, DispatchError> {
        if self.event.requires_item() && self.item.is_none() {
            return Err(DispatchError::MissingItem(self.event));
        }
        Ok(EventInfo {
            id: DispatchId::new(),
            event: self.event,
            item: self.item,
            timestamp: self.zone_manager.now(),
            zone: self.zone,
            owning_zone: self.owning_zone,
            zone_manager: self.zone_manager,
            device: self.device,
            custom_parameter: self.custom_parameter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert_manager::AlertManager;
    use crate::zone_manager::tests::Harness;
    use crate::zone_manager::ZoneManager;

    fn manager() -> Arc<ImmutableZoneManager> {
        let mut manager = ZoneManager::new();
        manager
            .add_zone(Zone::builder("Office").build().unwrap())
            .unwrap();
        manager.build(Harness::new(AlertManager::new()).services())
    }

    #[test]
    fn should_require_item_for_device_events() {
        let zm = manager();
        let zone = zm.zone_by_name("Office").unwrap();
        let result = EventInfo::builder(ZoneEvent::Motion, zone, zm).build();
        assert_eq!(
            result.err(),
            Some(DispatchError::MissingItem(ZoneEvent::Motion))
        );
    }

    #[test]
    fn should_allow_missing_item_for_timer_and_lifecycle_events() {
        let zm = manager();
        let zone = zm.zone_by_name("Office").unwrap();
        for event in [ZoneEvent::Timer, ZoneEvent::Startup, ZoneEvent::Destroy] {
            let info = EventInfo::builder(event, zone.clone(), zm.clone())
                .build()
                .unwrap();
            assert!(info.item().is_none());
        }
    }

    #[test]
    fn should_stamp_with_zone_manager_clock() {
        let zm = manager();
        let zone = zm.zone_by_name("Office").unwrap();
        let info = EventInfo::builder(ZoneEvent::Timer, zone, zm.clone())
            .custom_parameter(serde_json::json!({"door": "front"}))
            .build()
            .unwrap();
        assert_eq!(info.timestamp(), zm.now());
        assert_eq!(info.custom_parameter()["door"], "front");
    }
}
