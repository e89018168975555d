//! # zonehub-adapter-virtual
//!
//! Virtual adapter that stands in for the host runtime, for testing and
//! demonstration purposes.
//!
//! ## Provided pieces
//!
//! | Piece | Port | Behaviour |
//! |-------|------|-----------|
//! | [`InMemoryItemStore`] | `ItemGateway` | Keeps item values in memory, records commands and echoes changes onto the event bus |
//! | [`TracingNotifier`] | `Notifier` | Logs alerts through `tracing` |
//! | [`demo::demo_home`] | - | A small house with every action wired |
//!
//! ## Dependency rule
//!
//! Depends on `zonehub-app` (port traits) and `zonehub-domain` only.

pub mod demo;
mod item_store;
mod notifier;

pub use item_store::InMemoryItemStore;
pub use notifier::TracingNotifier;
