//! Zone manager: the aggregate root.
//!
//! [`ZoneManager`] collects zones and action registrations at
//! configuration time and validates them. [`ZoneManager::build`] freezes
//! the layout into an [`ImmutableZoneManager`], which owns the
//! cross-cutting services (item gateway, alert manager, scheduler, clock)
//! and answers the read-only queries actions rely on.

use std::collections::HashMap;
use std::sync::Arc;

use zonehub_domain::activity::{ActivityTimes, ActivityType};
use zonehub_domain::device::{ArmMode, Device, DeviceKind, ItemValue};
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::time::Timestamp;
use zonehub_domain::zone::{Zone, ZoneLookup};

use crate::actions::Action;
use crate::alert_manager::AlertManager;
use crate::clock::SystemClock;
use crate::ports::{Clock, ItemGateway, Scheduler};

/// Collaborators handed to the frozen zone manager.
pub struct Services {
    pub gateway: Arc<dyn ItemGateway>,
    pub alert_manager: Arc<AlertManager>,
    pub scheduler: Arc<dyn Scheduler>,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// Services on the system clock.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ItemGateway>,
        alert_manager: Arc<AlertManager>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            gateway,
            alert_manager,
            scheduler,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Mutable, configuration-time zone catalog.
#[derive(Default)]
pub struct ZoneManager {
    zones: Vec<Zone>,
    actions: Vec<Vec<Arc<dyn Action>>>,
    unique: HashMap<&'static str, String>,
}

impl ZoneManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateZone`] when a zone with the
    /// same name was already added.
    pub fn add_zone(&mut self, zone: Zone) -> Result<&mut Self, ConfigurationError> {
        if self.position(zone.name()).is_some() {
            return Err(ConfigurationError::DuplicateZone(zone.name().to_string()));
        }
        self.zones.push(zone);
        self.actions.push(Vec::new());
        Ok(self)
    }

    /// Register `action` on the zone named `zone_name`.
    ///
    /// Actions of a zone fire in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when:
    /// - the zone does not exist ([`ConfigurationError::UnknownZone`])
    /// - the action type allows a single instance and one is already
    ///   registered anywhere ([`ConfigurationError::DuplicateUniqueAction`])
    pub fn register_action(
        &mut self,
        zone_name: &str,
        action: impl Action + 'static,
    ) -> Result<&mut Self, ConfigurationError> {
        let index = self
            .position(zone_name)
            .ok_or_else(|| ConfigurationError::UnknownZone(zone_name.to_string()))?;

        let descriptor = action.descriptor();
        if descriptor.is_unique_instance() {
            if let Some(zone) = self.unique.get(descriptor.name()) {
                return Err(ConfigurationError::DuplicateUniqueAction {
                    action: descriptor.name(),
                    zone: zone.clone(),
                });
            }
            self.unique.insert(descriptor.name(), zone_name.to_string());
        }

        tracing::debug!(zone = zone_name, action = descriptor.name(), "action registered");
        self.actions[index].push(Arc::new(action));
        Ok(self)
    }

    #[must_use]
    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.position(name).map(|index| &self.zones[index])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|zone| zone.name() == name)
    }

    /// Freeze the catalog.
    #[must_use]
    pub fn build(self, services: Services) -> Arc<ImmutableZoneManager> {
        let zones: Vec<Arc<Zone>> = self.zones.into_iter().map(Arc::new).collect();
        let by_name = zones
            .iter()
            .enumerate()
            .map(|(index, zone)| (zone.name().to_string(), index))
            .collect();
        tracing::info!(
            zones = zones.len(),
            actions = self.actions.iter().map(Vec::len).sum::<usize>(),
            "zone manager ready"
        );
        Arc::new(ImmutableZoneManager {
            zones,
            actions: self.actions,
            by_name,
            gateway: services.gateway,
            alert_manager: services.alert_manager,
            scheduler: services.scheduler,
            clock: services.clock,
        })
    }
}

/// Frozen zone catalog with its services.
///
/// Device state stays mutable (it lives behind each device's lock);
/// zone structure and action registrations do not change.
pub struct ImmutableZoneManager {
    zones: Vec<Arc<Zone>>,
    actions: Vec<Vec<Arc<dyn Action>>>,
    by_name: HashMap<String, usize>,
    gateway: Arc<dyn ItemGateway>,
    alert_manager: Arc<AlertManager>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
}

impl ImmutableZoneManager {
    #[must_use]
    pub fn zones(&self) -> &[Arc<Zone>] {
        &self.zones
    }

    #[must_use]
    pub fn zone_by_name(&self, name: &str) -> Option<Arc<Zone>> {
        self.by_name
            .get(name)
            .map(|index| Arc::clone(&self.zones[*index]))
    }

    /// The first zone holding a device that owns `item`.
    #[must_use]
    pub fn zone_containing_item(&self, item: &str) -> Option<Arc<Zone>> {
        self.zones
            .iter()
            .find(|zone| zone.contains_item(item))
            .cloned()
    }

    /// Actions registered on `zone`, in registration order.
    #[must_use]
    pub fn actions_of(&self, zone: &Zone) -> &[Arc<dyn Action>] {
        self.by_name
            .get(zone.name())
            .map_or(&[][..], |index| self.actions[*index].as_slice())
    }

    /// Every device of `kind` (or a descendant kind) across all zones.
    #[must_use]
    pub fn devices_by_kind(&self, kind: DeviceKind) -> Vec<Arc<Device>> {
        self.zones
            .iter()
            .flat_map(|zone| zone.devices_by_kind(kind).cloned())
            .collect()
    }

    #[must_use]
    pub fn first_device_by_kind(&self, kind: DeviceKind) -> Option<Arc<Device>> {
        self.zones
            .iter()
            .find_map(|zone| zone.first_device_by_kind(kind).cloned())
    }

    /// The process-wide security partition, if one is configured.
    #[must_use]
    pub fn security_partition(&self) -> Option<Arc<Device>> {
        self.first_device_by_kind(DeviceKind::AlarmPartition)
    }

    /// The process-wide activity-times device, if one is configured.
    #[must_use]
    pub fn activity_times_device(&self) -> Option<Arc<Device>> {
        self.first_device_by_kind(DeviceKind::ActivityTimes)
    }

    /// Run `f` against the configured activity windows.
    pub fn with_activity_times<T>(&self, f: impl FnOnce(Option<&ActivityTimes>) -> T) -> T {
        let device = self.activity_times_device();
        f(device.as_deref().and_then(Device::activity_times))
    }

    /// Whether the local time is inside one of `activity`'s windows.
    ///
    /// `false` when no activity-times device is configured.
    #[must_use]
    pub fn is_in_activity(&self, activity: ActivityType) -> bool {
        let time = self.clock.local_time();
        self.with_activity_times(|times| times.is_some_and(|times| times.is_active(activity, time)))
    }

    /// Send `value` to `item` of `device`.
    ///
    /// The device cache is updated right away; the command is then
    /// forwarded to the item gateway without acknowledgment.
    #[tracing::instrument(skip(self, device), fields(device = device.name()))]
    pub fn send_command(&self, device: &Device, item: &str, value: ItemValue) {
        device.apply_value(item, value.clone());
        self.gateway.send_command(item, &value);
    }

    pub fn turn_on(&self, device: &Device) {
        self.send_command(device, device.item(), ItemValue::On);
    }

    pub fn turn_off(&self, device: &Device) {
        self.send_command(device, device.item(), ItemValue::Off);
    }

    /// Move an alarm partition to `mode`. Returns `false` when `device`
    /// is not a partition.
    pub fn set_arm_mode(&self, partition: &Device, mode: ArmMode) -> bool {
        let Some(item) = partition.arm_mode_item() else {
            tracing::warn!(device = partition.name(), "not an alarm partition");
            return false;
        };
        let item = item.to_string();
        self.send_command(partition, &item, mode.to_value());
        tracing::info!(device = partition.name(), %mode, "arm mode changed");
        true
    }

    #[must_use]
    pub fn alert_manager(&self) -> &AlertManager {
        &self.alert_manager
    }

    #[must_use]
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl ZoneLookup for ImmutableZoneManager {
    fn zone_by_name(&self, name: &str) -> Option<Arc<Zone>> {
        ImmutableZoneManager::zone_by_name(self, name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::actions::ActionError;
    use crate::clock::FixedClock;
    use crate::event_info::EventInfo;
    use crate::scheduler::ManualScheduler;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use zonehub_domain::action::ActionDescriptor;
    use zonehub_domain::event::ZoneEvent;
    use zonehub_domain::neighbor::NeighborType;

    /// Gateway recording every command it receives.
    #[derive(Default)]
    pub(crate) struct RecordingGateway {
        pub(crate) commands: Mutex<Vec<(String, ItemValue)>>,
    }

    impl RecordingGateway {
        pub(crate) fn commands(&self) -> Vec<(String, ItemValue)> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl ItemGateway for RecordingGateway {
        fn send_command(&self, item: &str, value: &ItemValue) {
            self.commands
                .lock()
                .unwrap()
                .push((item.to_string(), value.clone()));
        }
    }

    /// Wiring shared by the app-level tests.
    pub(crate) struct Harness {
        pub(crate) gateway: Arc<RecordingGateway>,
        pub(crate) scheduler: Arc<ManualScheduler>,
        pub(crate) clock: Arc<FixedClock>,
        pub(crate) alert_manager: Arc<AlertManager>,
    }

    impl Harness {
        /// Harness at 2024-06-01 10:00 UTC.
        pub(crate) fn new(alert_manager: AlertManager) -> Self {
            let clock = Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            ));
            Self {
                gateway: Arc::default(),
                scheduler: Arc::new(ManualScheduler::new()),
                alert_manager: Arc::new(alert_manager.with_clock(clock.clone())),
                clock,
            }
        }

        pub(crate) fn services(&self) -> Services {
            Services::new(
                self.gateway.clone(),
                self.alert_manager.clone(),
                self.scheduler.clone(),
            )
            .with_clock(self.clock.clone())
        }
    }

    struct Noop(ActionDescriptor);

    impl Noop {
        fn new(name: &'static str, unique: bool) -> Self {
            Self(
                ActionDescriptor::builder(name)
                    .event(ZoneEvent::Motion)
                    .unique_instance(unique)
                    .build()
                    .unwrap(),
            )
        }
    }

    impl Action for Noop {
        fn descriptor(&self) -> &ActionDescriptor {
            &self.0
        }

        fn on_action(&self, _event: &EventInfo) -> Result<bool, ActionError> {
            Ok(true)
        }
    }

    fn layout() -> ZoneManager {
        let mut manager = ZoneManager::new();
        manager
            .add_zone(
                Zone::builder("Kitchen")
                    .device(Device::builder(DeviceKind::Light, "kitchen_light").build().unwrap())
                    .neighbor("Living", NeighborType::OpenSpace)
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .add_zone(
                Zone::builder("Living")
                    .device(
                        Device::builder(DeviceKind::AlarmPartition, "alarm")
                            .secondary_item("alarm_mode")
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .unwrap();
        manager
    }

    #[test]
    fn should_reject_duplicate_zone() {
        let mut manager = layout();
        let result = manager.add_zone(Zone::builder("Kitchen").build().unwrap());
        assert_eq!(
            result.err(),
            Some(ConfigurationError::DuplicateZone("Kitchen".to_string()))
        );
    }

    #[test]
    fn should_reject_second_unique_action_across_zones() {
        let mut manager = layout();
        manager
            .register_action("Kitchen", Noop::new("Unique", true))
            .unwrap();
        let result = manager.register_action("Living", Noop::new("Unique", true));
        assert_eq!(
            result.err(),
            Some(ConfigurationError::DuplicateUniqueAction {
                action: "Unique",
                zone: "Kitchen".to_string(),
            })
        );
    }

    #[test]
    fn should_allow_multiple_instances_of_regular_action() {
        let mut manager = layout();
        manager
            .register_action("Kitchen", Noop::new("Regular", false))
            .unwrap()
            .register_action("Kitchen", Noop::new("Regular", false))
            .unwrap();
        let harness = Harness::new(AlertManager::new());
        let zm = manager.build(harness.services());
        let kitchen = zm.zone_by_name("Kitchen").unwrap();
        assert_eq!(zm.actions_of(&kitchen).len(), 2);
    }

    #[test]
    fn should_reject_action_on_unknown_zone() {
        let mut manager = layout();
        let result = manager.register_action("Attic", Noop::new("Regular", false));
        assert_eq!(
            result.err(),
            Some(ConfigurationError::UnknownZone("Attic".to_string()))
        );
    }

    #[test]
    fn should_answer_catalog_queries() {
        let harness = Harness::new(AlertManager::new());
        let zm = layout().build(harness.services());

        assert_eq!(zm.zones().len(), 2);
        assert_eq!(zm.zone_containing_item("alarm_mode").unwrap().name(), "Living");
        assert!(zm.zone_containing_item("unknown").is_none());
        assert_eq!(zm.devices_by_kind(DeviceKind::Switch).len(), 1);
        assert_eq!(zm.security_partition().unwrap().item(), "alarm");
        assert!(zm.activity_times_device().is_none());
        assert!(!zm.is_in_activity(ActivityType::SleepTime));
    }

    #[test]
    fn should_resolve_neighbors_through_manager() {
        let harness = Harness::new(AlertManager::new());
        let zm = layout().build(harness.services());
        let kitchen = zm.zone_by_name("Kitchen").unwrap();
        let neighbors = kitchen.neighbor_zones(zm.as_ref(), &[NeighborType::OpenSpace]);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].name(), "Living");
    }

    #[test]
    fn should_update_cache_and_forward_command() {
        let harness = Harness::new(AlertManager::new());
        let zm = layout().build(harness.services());
        let light = zm.first_device_by_kind(DeviceKind::Light).unwrap();

        zm.turn_on(&light);

        assert!(light.is_on());
        assert_eq!(
            harness.gateway.commands(),
            vec![("kitchen_light".to_string(), ItemValue::On)]
        );
    }

    #[test]
    fn should_send_arm_mode_to_partition_secondary_item() {
        let harness = Harness::new(AlertManager::new());
        let zm = layout().build(harness.services());
        let partition = zm.security_partition().unwrap();

        assert!(zm.set_arm_mode(&partition, ArmMode::ArmAway));
        assert_eq!(partition.arm_mode(), Some(ArmMode::ArmAway));

        let light = zm.first_device_by_kind(DeviceKind::Light).unwrap();
        assert!(!zm.set_arm_mode(&light, ArmMode::ArmAway));
    }
}
