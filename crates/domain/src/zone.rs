//! Zone: a room or area holding devices, classified by level and
//! internal/external placement, with typed neighbor relations.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::device::{Device, DeviceKind};
use crate::error::ConfigurationError;
use crate::level::Level;
use crate::neighbor::{Neighbor, NeighborType};
use crate::time::Timestamp;

/// Resolves zones by name. Implemented by the zone manager.
pub trait ZoneLookup {
    fn zone_by_name(&self, name: &str) -> Option<Arc<Zone>>;
}

/// A room or area. Structure is immutable once built.
#[derive(Debug)]
pub struct Zone {
    name: String,
    level: Level,
    external: bool,
    devices: Vec<Arc<Device>>,
    neighbors: Vec<Neighbor>,
}

impl Zone {
    /// Create a builder for a zone named `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ZoneBuilder {
        ZoneBuilder {
            name: name.into(),
            ..ZoneBuilder::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.external
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        !self.external
    }

    /// Devices in declaration order.
    #[must_use]
    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    #[must_use]
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Devices of `kind` or of a descendant kind, in declaration order.
    pub fn devices_by_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.iter().filter(move |device| device.is_a(kind))
    }

    #[must_use]
    pub fn first_device_by_kind(&self, kind: DeviceKind) -> Option<&Arc<Device>> {
        self.devices_by_kind(kind).next()
    }

    #[must_use]
    pub fn has_device_kind(&self, kind: DeviceKind) -> bool {
        self.first_device_by_kind(kind).is_some()
    }

    #[must_use]
    pub fn device_by_item(&self, item: &str) -> Option<&Arc<Device>> {
        self.devices.iter().find(|device| device.contains_item(item))
    }

    #[must_use]
    pub fn contains_item(&self, item: &str) -> bool {
        self.device_by_item(item).is_some()
    }

    /// Resolve the declared neighbors through `lookup`.
    ///
    /// Keeps declaration order, keeps only relations whose type is in
    /// `allowed` (an empty slice allows every type), and silently drops
    /// names that do not resolve.
    pub fn neighbor_zones(
        &self,
        lookup: &impl ZoneLookup,
        allowed: &[NeighborType],
    ) -> Vec<Arc<Zone>> {
        self.neighbors
            .iter()
            .filter(|neighbor| allowed.is_empty() || allowed.contains(&neighbor.kind))
            .filter_map(|neighbor| lookup.zone_by_name(&neighbor.zone_name))
            .collect()
    }

    /// Whether any device of one of `kinds` reports occupancy within
    /// `window`. An empty `kinds` slice checks every device.
    ///
    /// Returns the first qualifying device for diagnostics.
    #[must_use]
    pub fn is_occupied(
        &self,
        kinds: &[DeviceKind],
        window: Duration,
        now: Timestamp,
    ) -> (bool, Option<Arc<Device>>) {
        let found = self
            .devices
            .iter()
            .filter(|device| kinds.is_empty() || kinds.iter().any(|kind| device.is_a(*kind)))
            .find(|device| device.is_occupied(now, window))
            .cloned();
        (found.is_some(), found)
    }

    /// Whether at least one light in the zone is on.
    #[must_use]
    pub fn is_light_on(&self) -> bool {
        self.devices_by_kind(DeviceKind::Light)
            .any(|light| light.is_on())
    }
}

/// Step-by-step builder for [`Zone`].
#[derive(Debug, Default)]
pub struct ZoneBuilder {
    name: String,
    level: Level,
    external: bool,
    devices: Vec<Device>,
    neighbors: Vec<Neighbor>,
}

impl ZoneBuilder {
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    #[must_use]
    pub fn device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    #[must_use]
    pub fn neighbor(mut self, zone_name: impl Into<String>, kind: NeighborType) -> Self {
        self.neighbors.push(Neighbor::new(zone_name, kind));
        self
    }

    /// Consume the builder, validate, and return a [`Zone`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when:
    /// - `name` is empty ([`ConfigurationError::EmptyName`])
    /// - two devices share a primary item ([`ConfigurationError::DuplicateDeviceItem`])
    pub fn build(self) -> Result<Zone, ConfigurationError> {
        if self.name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.item().to_string()) {
                return Err(ConfigurationError::DuplicateDeviceItem {
                    zone: self.name,
                    item: device.item().to_string(),
                });
            }
        }
        Ok(Zone {
            name: self.name,
            level: self.level,
            external: self.external,
            devices: self.devices.into_iter().map(Arc::new).collect(),
            neighbors: self.neighbors,
        })
    }
}
