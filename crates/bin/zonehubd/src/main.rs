//! # zonehubd: zonehub daemon
//!
//! Composition root that wires the zone manager, the dispatcher and the
//! virtual adapter together.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise the tracing subscriber
//! - Build the zone layout and freeze it with its services
//! - Broadcast `Startup`, run the inbound feed until SIGINT, broadcast `Destroy`
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod feed;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use zonehub_adapter_virtual::demo::demo_home;
use zonehub_adapter_virtual::{InMemoryItemStore, TracingNotifier};
use zonehub_app::alert_manager::AlertManager;
use zonehub_app::dispatcher::EventDispatcher;
use zonehub_app::event_bus::InProcessEventBus;
use zonehub_app::scheduler::TokioScheduler;
use zonehub_app::zone_manager::{Services, ZoneManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Item store and feed
    let bus = InProcessEventBus::new(256);
    let store = Arc::new(InMemoryItemStore::with_bus(bus.clone()));

    // Alerts
    let mut alert_manager = AlertManager::new()
        .with_owner_channel(Arc::new(TracingNotifier::new("owner")))
        .with_owner_min_level(config.alerts.owner_min_level);
    if config.alerts.admin_enabled {
        alert_manager = alert_manager.with_admin_channel(Arc::new(TracingNotifier::new("admin")));
    }

    // Zones
    let layout = if config.demo.enabled {
        demo_home(&config.demo_options())?
    } else {
        tracing::warn!("demo layout disabled, running without zones");
        ZoneManager::new()
    };
    let scheduler = Arc::new(TokioScheduler::current());
    let zone_manager = layout.build(Services::new(
        store.clone(),
        Arc::new(alert_manager),
        scheduler.clone(),
    ));
    let dispatcher = EventDispatcher::new(zone_manager);

    let changes = bus.subscribe();
    dispatcher.broadcast_startup();
    let feed_task = tokio::spawn(feed::run(dispatcher.clone(), changes));
    let stdin_task = config.feed.stdin.then(|| {
        tokio::spawn(async move {
            match feed::read_stdin(store).await {
                Ok(applied) => tracing::info!(applied, "stdin feed closed"),
                Err(err) => tracing::error!(%err, "stdin feed failed"),
            }
        })
    });

    tracing::info!("zonehubd running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    if let Some(task) = stdin_task {
        task.abort();
    }
    feed_task.abort();
    dispatcher.broadcast_destroy();
    scheduler.shutdown();

    Ok(())
}
