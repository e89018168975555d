//! Demo home layout.
//!
//! ```text
//!   FrontPorch (external) ── front_door
//!   Garden     (external) ── patio_door, garden_motion
//!   Kitchen  ══ open space ══ Dining ── open space slave ── Living
//!   Living     (first floor, alarm partition, TV)
//!   Bedroom    (second floor)
//!   Utility    (basement, gas and water leak sensors)
//! ```

use std::time::Duration;

use zonehub_app::actions::{
    AlertOnExternalDoorLeftOpen, AlertOnHighGasLevel, AlertOnHumidityOutOfRange,
    AlertOnInactiveDevices, AlertOnLowBatteryLevel, AlertOnSecurityAlarmTriggered,
    AlertOnTemperatureOutOfRange, AlertOnWaterLeak, ArmAfterFrontDoorClosed,
    DisarmOnInternalMotion, TurnOffAdjacentZones, TurnOnLightsOnMotion,
};
use zonehub_app::zone_manager::ZoneManager;
use zonehub_domain::activity::{ActivityTimes, ActivityType};
use zonehub_domain::device::{ArmMode, Device, DeviceKind};
use zonehub_domain::error::ConfigurationError;
use zonehub_domain::level::Level;
use zonehub_domain::neighbor::NeighborType;
use zonehub_domain::zone::Zone;

/// Tunables of the demo layout.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub inactive_check_every: Duration,
    pub inactive_threshold: Duration,
    pub door_max_open: Duration,
    pub arm_check_after: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            inactive_check_every: AlertOnInactiveDevices::DEFAULT_CHECK_EVERY,
            inactive_threshold: AlertOnInactiveDevices::DEFAULT_THRESHOLD,
            door_max_open: AlertOnExternalDoorLeftOpen::DEFAULT_MAX_OPEN,
            arm_check_after: ArmAfterFrontDoorClosed::DEFAULT_CHECK_AFTER,
        }
    }
}

fn device(kind: DeviceKind, item: &str) -> Result<Device, ConfigurationError> {
    Device::builder(kind, item).build()
}

fn battery_sensor(kind: DeviceKind, item: &str) -> Result<Device, ConfigurationError> {
    Device::builder(kind, item)
        .battery_item(format!("{item}_battery"))
        .auto_report(true)
        .build()
}

fn activity_times() -> Result<Device, ConfigurationError> {
    let times = ActivityTimes::new()
        .with(ActivityType::Lunch, "12:00-13:30")?
        .with(ActivityType::Dinner, "18:00-20:00")?
        .with(ActivityType::SleepTime, "23:00-07:00")?
        .with(ActivityType::Quiet, "14:00-16:00, 20:00-22:59")?
        .with(ActivityType::WakeUp, "06:35-07:00")?
        .with(ActivityType::AutoArmStay, "20:00-02:00")?
        .with(ActivityType::TurnOffPlugs, "23:30-23:45")?;
    Device::builder(DeviceKind::ActivityTimes, "activity_times")
        .name("activity times")
        .activity_times(times)
        .build()
}

/// Build the demo home with every action registered.
///
/// # Errors
///
/// Returns [`ConfigurationError`] when an option is invalid (e.g. a zero
/// duration).
pub fn demo_home(options: &DemoOptions) -> Result<ZoneManager, ConfigurationError> {
    let mut manager = ZoneManager::new();
    manager
        .add_zone(
            Zone::builder("FrontPorch")
                .external(true)
                .device(Device::builder(DeviceKind::Door, "front_door").name("front door").build()?)
                .build()?,
        )?
        .add_zone(
            Zone::builder("Garden")
                .external(true)
                .device(Device::builder(DeviceKind::Door, "patio_door").name("patio door").build()?)
                .device(device(DeviceKind::MotionSensor, "garden_motion")?)
                .build()?,
        )?
        .add_zone(
            Zone::builder("Kitchen")
                .level(Level::FirstFloor)
                .device(device(DeviceKind::Light, "kitchen_light")?)
                .device(battery_sensor(DeviceKind::MotionSensor, "kitchen_motion")?)
                .device(battery_sensor(DeviceKind::HumiditySensor, "kitchen_humidity")?)
                .device(
                    Device::builder(DeviceKind::Plug, "kitchen_kettle")
                        .secondary_item("kitchen_kettle_power")
                        .power_threshold(20.0)
                        .build()?,
                )
                .neighbor("Dining", NeighborType::OpenSpace)
                .build()?,
        )?
        .add_zone(
            Zone::builder("Dining")
                .level(Level::FirstFloor)
                .device(device(DeviceKind::Dimmer, "dining_light")?)
                .neighbor("Kitchen", NeighborType::OpenSpace)
                .neighbor("Living", NeighborType::OpenSpaceSlave)
                .build()?,
        )?
        .add_zone(
            Zone::builder("Living")
                .level(Level::FirstFloor)
                .device(device(DeviceKind::Light, "living_light")?)
                .device(battery_sensor(DeviceKind::MotionSensor, "living_motion")?)
                .device(battery_sensor(DeviceKind::TemperatureSensor, "living_temperature")?)
                .device(device(DeviceKind::Tv, "living_tv")?)
                .device(
                    Device::builder(DeviceKind::AlarmPartition, "alarm")
                        .name("alarm partition")
                        .secondary_item("alarm_mode")
                        .initial_value("alarm_mode", ArmMode::Unarmed.to_value())
                        .build()?,
                )
                .device(activity_times()?)
                .neighbor("Dining", NeighborType::OpenSpaceMaster)
                .build()?,
        )?
        .add_zone(
            Zone::builder("Bedroom")
                .level(Level::SecondFloor)
                .device(device(DeviceKind::Light, "bedroom_light")?)
                .device(battery_sensor(DeviceKind::MotionSensor, "bedroom_motion")?)
                .device(device(DeviceKind::NetworkPresence, "phone_presence")?)
                .device(Device::builder(DeviceKind::Window, "bedroom_window").tracks_security(false).build()?)
                .build()?,
        )?
        .add_zone(
            Zone::builder("Utility")
                .level(Level::Basement)
                .device(device(DeviceKind::GasSensor, "utility_gas")?)
                .device(battery_sensor(DeviceKind::WaterLeakSensor, "utility_leak")?)
                .build()?,
        )?;

    for zone in ["Kitchen", "Dining", "Living", "Bedroom"] {
        manager
            .register_action(zone, TurnOnLightsOnMotion::new()?)?
            .register_action(zone, TurnOffAdjacentZones::new()?)?;
    }
    for zone in ["Kitchen", "Living", "Bedroom", "Utility"] {
        manager
            .register_action(zone, AlertOnLowBatteryLevel::new(AlertOnLowBatteryLevel::DEFAULT_THRESHOLD)?)?;
    }
    manager
        .register_action("Living", DisarmOnInternalMotion::new()?)?
        .register_action("Living", AlertOnSecurityAlarmTriggered::new()?)?
        .register_action("Living", AlertOnTemperatureOutOfRange::new()?)?
        .register_action(
            "Living",
            AlertOnInactiveDevices::new(options.inactive_check_every, options.inactive_threshold)?,
        )?
        .register_action("Kitchen", AlertOnHumidityOutOfRange::new()?)?
        .register_action("Utility", AlertOnHighGasLevel::new()?)?
        .register_action("Utility", AlertOnWaterLeak::new()?)?
        .register_action("FrontPorch", AlertOnExternalDoorLeftOpen::new(options.door_max_open)?)?
        .register_action("Garden", AlertOnExternalDoorLeftOpen::new(options.door_max_open)?)?
        .register_action(
            "FrontPorch",
            ArmAfterFrontDoorClosed::new(ArmAfterFrontDoorClosed::DEFAULT_ZONE_PATTERN, options.arm_check_after)?,
        )?;
    Ok(manager)
}
