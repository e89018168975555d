//! # zonehub-app
//!
//! Application layer: the event dispatch engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ItemGateway`: fire-and-forget commands to the underlying items
//!   - `Notifier`: one alert transport (push, email, log, …)
//!   - `Scheduler`: periodic and one-shot cancellable jobs
//!   - `Clock`: current time, injectable for tests
//! - Own the **zone manager**: zone catalog, action registry and the
//!   read-only queries actions rely on
//! - Run the **event dispatcher**: resolve the device, build an
//!   `EventInfo`, filter actions by descriptor and invoke them with
//!   per-action failure isolation
//! - Route alerts through the **alert manager** (min-interval suppression)
//! - Ship the concrete **actions**
//! - Provide **in-process infrastructure** (event bus, schedulers) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `zonehub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actions;
pub mod alert_manager;
pub mod clock;
pub mod dispatcher;
pub mod event_bus;
pub mod event_info;
pub mod ports;
pub mod scheduler;
pub mod zone_manager;
