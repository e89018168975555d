//! End-to-end tests for the wired zonehubd stack.
//!
//! Each test builds the demo home on top of the virtual item store, a
//! recording notifier and a manual scheduler, then feeds item changes
//! through the bus exactly like the daemon's feed loop does.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::broadcast;
use zonehub_adapter_virtual::InMemoryItemStore;
use zonehub_adapter_virtual::demo::{DemoOptions, demo_home};
use zonehub_app::alert_manager::AlertManager;
use zonehub_app::clock::FixedClock;
use zonehub_app::dispatcher::EventDispatcher;
use zonehub_app::event_bus::{InProcessEventBus, ItemChange};
use zonehub_app::ports::{Notifier, NotifierError};
use zonehub_app::scheduler::ManualScheduler;
use zonehub_app::zone_manager::Services;
use zonehub_domain::alert::{Alert, AlertLevel};
use zonehub_domain::device::{ArmMode, ItemValue};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|alert| alert.subject().to_string())
            .collect()
    }

    fn levels(&self) -> Vec<AlertLevel> {
        self.sent.lock().unwrap().iter().map(Alert::level).collect()
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

struct Home {
    store: Arc<InMemoryItemStore>,
    owner: Arc<RecordingNotifier>,
    admin: Arc<RecordingNotifier>,
    scheduler: Arc<ManualScheduler>,
    clock: Arc<FixedClock>,
    dispatcher: EventDispatcher,
    changes: broadcast::Receiver<ItemChange>,
}

impl Home {
    fn new() -> Self {
        let bus = InProcessEventBus::new(256);
        let changes = bus.subscribe();
        let store = Arc::new(InMemoryItemStore::with_bus(bus));
        let owner = Arc::new(RecordingNotifier::default());
        let admin = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ManualScheduler::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        ));
        let alert_manager = AlertManager::new()
            .with_owner_channel(owner.clone())
            .with_admin_channel(admin.clone())
            .with_owner_min_level(AlertLevel::Info)
            .with_clock(clock.clone());
        let services = Services::new(store.clone(), Arc::new(alert_manager), scheduler.clone())
            .with_clock(clock.clone());
        let zone_manager = demo_home(&DemoOptions::default())
            .expect("demo home should build")
            .build(services);
        let dispatcher = EventDispatcher::new(zone_manager);
        dispatcher.broadcast_startup();
        Self {
            store,
            owner,
            admin,
            scheduler,
            clock,
            dispatcher,
            changes,
        }
    }

    /// Simulate a host change and dispatch everything it causes.
    fn set(&mut self, item: &str, value: ItemValue) {
        self.store.set(item, value);
        self.pump();
    }

    fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        self.scheduler.advance(by);
        self.pump();
    }

    fn pump(&mut self) {
        while let Ok(ItemChange { item, value }) = self.changes.try_recv() {
            self.dispatcher
                .dispatch_item_change(&item, value)
                .expect("demo item should resolve");
        }
    }
}

// ---------------------------------------------------------------------------
// Lights
// ---------------------------------------------------------------------------

#[test]
fn should_turn_on_light_on_motion_and_turn_off_open_space_neighbor() {
    let mut home = Home::new();
    home.set("dining_light", ItemValue::On);

    home.set("kitchen_motion", ItemValue::On);

    assert_eq!(home.store.get("kitchen_light"), Some(ItemValue::On));
    assert_eq!(home.store.get("dining_light"), Some(ItemValue::Off));
}

// ---------------------------------------------------------------------------
// Doors and security
// ---------------------------------------------------------------------------

#[test]
fn should_alert_when_front_door_left_open() {
    let mut home = Home::new();
    home.set("front_door", ItemValue::Open);

    home.advance(Duration::from_secs(14 * 60));
    assert!(home.owner.subjects().is_empty());

    home.advance(Duration::from_secs(60));
    assert_eq!(
        home.owner.subjects(),
        vec!["[FrontPorch] The front door has been open for 15 minutes".to_string()]
    );
}

#[test]
fn should_not_alert_when_door_closed_in_time() {
    let mut home = Home::new();
    home.set("front_door", ItemValue::Open);
    home.advance(Duration::from_secs(60));
    home.set("front_door", ItemValue::Closed);

    home.advance(Duration::from_secs(30 * 60));

    assert!(home.owner.subjects().is_empty());
}

#[test]
fn should_arm_away_after_leaving_empty_house() {
    let mut home = Home::new();
    home.set("alarm_mode", ArmMode::Unarmed.to_value());
    home.set("front_door", ItemValue::Open);
    home.set("front_door", ItemValue::Closed);

    home.advance(Duration::from_secs(10 * 60));

    assert_eq!(home.store.get("alarm_mode"), Some(ArmMode::ArmAway.to_value()));
}

#[test]
fn should_not_arm_when_someone_is_home() {
    let mut home = Home::new();
    home.set("front_door", ItemValue::Open);
    home.set("front_door", ItemValue::Closed);
    home.advance(Duration::from_secs(60));
    home.set("bedroom_motion", ItemValue::On);

    home.advance(Duration::from_secs(10 * 60));

    assert_ne!(home.store.get("alarm_mode"), Some(ArmMode::ArmAway.to_value()));
}

#[test]
fn should_send_critical_alert_when_alarm_triggers() {
    let mut home = Home::new();

    home.set("alarm", ItemValue::On);

    assert_eq!(home.owner.levels(), vec![AlertLevel::Critical]);
}

// ---------------------------------------------------------------------------
// Hazards and sensors
// ---------------------------------------------------------------------------

#[test]
fn should_suppress_repeated_gas_alert_within_interval() {
    let mut home = Home::new();

    home.set("utility_gas", ItemValue::On);
    home.set("utility_gas", ItemValue::Off);
    home.set("utility_gas", ItemValue::On);

    assert_eq!(
        home.owner.levels(),
        vec![AlertLevel::Critical, AlertLevel::Info]
    );
}

#[test]
fn should_alert_once_per_temperature_step() {
    let mut home = Home::new();

    for reading in [31.0, 32.0, 33.0] {
        home.set("living_temperature", ItemValue::Number(reading));
    }
    assert_eq!(home.owner.levels(), vec![AlertLevel::Warning]);

    home.advance(Duration::from_secs(31 * 60));
    home.set("living_temperature", ItemValue::Number(35.0));

    assert_eq!(home.owner.levels(), vec![AlertLevel::Warning, AlertLevel::Warning]);
}

#[test]
fn should_route_low_battery_to_admin() {
    let mut home = Home::new();

    home.set("kitchen_motion_battery", ItemValue::Number(9.0));

    assert!(home.owner.subjects().is_empty());
    assert_eq!(home.admin.levels(), vec![AlertLevel::Warning]);
}

#[test]
fn should_report_unknown_item() {
    let home = Home::new();

    let result = home
        .dispatcher
        .dispatch_item_change("garage_light", ItemValue::On);

    assert!(result.is_err());
}
