//! Action descriptor: declarative metadata deciding when an action runs.
//!
//! Every action instance carries one descriptor, built at construction
//! time. The dispatcher tests the descriptor against the event and the
//! zone before invoking the action.

use chrono::NaiveTime;
use regex::Regex;

use crate::activity::{ActivityTimes, ActivityType};
use crate::device::DeviceKind;
use crate::error::ConfigurationError;
use crate::event::ZoneEvent;
use crate::level::Level;
use crate::zone::Zone;

/// Why an action was not eligible for a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event is not in the trigger set.
    Event,
    /// The zone is internal and the action (or this event) is external-only.
    InternalZone,
    /// The zone is external and the action does not apply to external zones.
    ExternalZone,
    /// The zone lacks a device of a required kind.
    MissingDevice(DeviceKind),
    /// The zone name does not match the pattern.
    ZoneName,
    /// The zone level is not allowed.
    Level,
    /// No activity-times device is configured.
    NoActivityTimes,
    /// The current time is outside every listed activity window.
    Activity,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event => f.write_str("event not handled"),
            Self::InternalZone => f.write_str("not applicable to internal zone"),
            Self::ExternalZone => f.write_str("not applicable to external zone"),
            Self::MissingDevice(kind) => write!(f, "zone has no {kind}"),
            Self::ZoneName => f.write_str("zone name does not match"),
            Self::Level => f.write_str("zone level not allowed"),
            Self::NoActivityTimes => f.write_str("no activity times configured"),
            Self::Activity => f.write_str("outside activity windows"),
        }
    }
}

/// Metadata attached to an action instance.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    name: &'static str,
    events: Vec<ZoneEvent>,
    external_events: Vec<ZoneEvent>,
    devices: Vec<DeviceKind>,
    internal: bool,
    external: bool,
    zone_name_pattern: Option<Regex>,
    levels: Vec<Level>,
    activities: Vec<ActivityType>,
    unique_instance: bool,
}

impl ActionDescriptor {
    /// Create a builder for the action type `name`.
    #[must_use]
    pub fn builder(name: &'static str) -> ActionDescriptorBuilder {
        ActionDescriptorBuilder {
            name,
            events: Vec::new(),
            external_events: Vec::new(),
            devices: Vec::new(),
            internal: true,
            external: false,
            zone_name_pattern: None,
            levels: Vec::new(),
            activities: Vec::new(),
            unique_instance: false,
        }
    }

    /// Type tag of the action; also the key for the uniqueness constraint.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn events(&self) -> &[ZoneEvent] {
        &self.events
    }

    #[must_use]
    pub fn handles(&self, event: ZoneEvent) -> bool {
        self.events.contains(&event)
    }

    #[must_use]
    pub fn devices(&self) -> &[DeviceKind] {
        &self.devices
    }

    #[must_use]
    pub fn is_unique_instance(&self) -> bool {
        self.unique_instance
    }

    #[must_use]
    pub fn activities(&self) -> &[ActivityType] {
        &self.activities
    }

    /// Whether the action applies to `zone` for `event`, ignoring
    /// activity windows. Lifecycle events only need to be in the
    /// trigger set.
    ///
    /// # Errors
    ///
    /// Returns the first [`SkipReason`] that makes the action ineligible.
    pub fn check_zone(&self, event: ZoneEvent, zone: &Zone) -> Result<(), SkipReason> {
        if !self.handles(event) {
            return Err(SkipReason::Event);
        }
        if event.is_lifecycle() {
            return Ok(());
        }

        let external_only_event = self.external_events.contains(&event);
        if zone.is_external() {
            if !self.external && !external_only_event {
                return Err(SkipReason::ExternalZone);
            }
        } else if !self.internal || external_only_event {
            return Err(SkipReason::InternalZone);
        }

        if let Some(kind) = self.devices.iter().find(|kind| !zone.has_device_kind(**kind)) {
            return Err(SkipReason::MissingDevice(*kind));
        }
        if let Some(pattern) = &self.zone_name_pattern {
            if !pattern.is_match(zone.name()) {
                return Err(SkipReason::ZoneName);
            }
        }
        if !self.levels.is_empty() && !self.levels.contains(&zone.level()) {
            return Err(SkipReason::Level);
        }
        Ok(())
    }

    /// Whether the activity filter (if any) accepts `time`.
    ///
    /// # Errors
    ///
    /// Returns [`SkipReason::NoActivityTimes`] when a filter is declared
    /// but no activity times are configured, and [`SkipReason::Activity`]
    /// when `time` is outside every listed window.
    pub fn check_activity(
        &self,
        activity_times: Option<&ActivityTimes>,
        time: NaiveTime,
    ) -> Result<(), SkipReason> {
        if self.activities.is_empty() {
            return Ok(());
        }
        let times = activity_times.ok_or(SkipReason::NoActivityTimes)?;
        if times.is_any_active(&self.activities, time) {
            Ok(())
        } else {
            Err(SkipReason::Activity)
        }
    }
}

/// Step-by-step builder for [`ActionDescriptor`].
#[derive(Debug)]
pub struct ActionDescriptorBuilder {
    name: &'static str,
    events: Vec<ZoneEvent>,
    external_events: Vec<ZoneEvent>,
    devices: Vec<DeviceKind>,
    internal: bool,
    external: bool,
    zone_name_pattern: Option<String>,
    levels: Vec<Level>,
    activities: Vec<ActivityType>,
    unique_instance: bool,
}

impl ActionDescriptorBuilder {
    #[must_use]
    pub fn event(mut self, event: ZoneEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Declare an event that is only handled in external zones.
    ///
    /// The event is added to the trigger set as well.
    #[must_use]
    pub fn external_event(mut self, event: ZoneEvent) -> Self {
        self.events.push(event);
        self.external_events.push(event);
        self
    }

    /// Require the zone to hold at least one device of `kind`.
    #[must_use]
    pub fn device(mut self, kind: DeviceKind) -> Self {
        self.devices.push(kind);
        self
    }

    #[must_use]
    pub fn internal(mut self, value: bool) -> Self {
        self.internal = value;
        self
    }

    #[must_use]
    pub fn external(mut self, value: bool) -> Self {
        self.external = value;
        self
    }

    /// Restrict to zones whose name matches `pattern` (regex search).
    #[must_use]
    pub fn zone_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.zone_name_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.levels.push(level);
        self
    }

    /// Only fire while one of the listed activities is active.
    #[must_use]
    pub fn activity(mut self, activity: ActivityType) -> Self {
        self.activities.push(activity);
        self
    }

    #[must_use]
    pub fn unique_instance(mut self, value: bool) -> Self {
        self.unique_instance = value;
        self
    }

    /// Consume the builder, validate, and return an [`ActionDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when:
    /// - no event is declared ([`ConfigurationError::NoEvents`])
    /// - the zone name pattern does not compile
    ///   ([`ConfigurationError::InvalidZoneNamePattern`])
    pub fn build(mut self) -> Result<ActionDescriptor, ConfigurationError> {
        if self.events.is_empty() {
            return Err(ConfigurationError::NoEvents { action: self.name });
        }
        self.events.dedup();
        let zone_name_pattern = self
            .zone_name_pattern
            .map(|pattern| {
                Regex::new(&pattern).map_err(|err| ConfigurationError::InvalidZoneNamePattern {
                    reason: err.to_string(),
                    pattern,
                })
            })
            .transpose()?;

        Ok(ActionDescriptor {
            name: self.name,
            events: self.events,
            external_events: self.external_events,
            devices: self.devices,
            internal: self.internal,
            external: self.external,
            zone_name_pattern,
            levels: self.levels,
            activities: self.activities,
            unique_instance: self.unique_instance,
        })
    }
}
