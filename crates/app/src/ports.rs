//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the dispatch layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod item_gateway;
pub mod notifier;
pub mod scheduler;

pub use clock::Clock;
pub use item_gateway::ItemGateway;
pub use notifier::{Notifier, NotifierError};
pub use scheduler::{Job, RepeatingJob, Scheduler};
