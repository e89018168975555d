//! Scheduler port: periodic and one-shot cancellable jobs.

use std::time::Duration;

use zonehub_domain::id::TimerId;

/// A job run once after a delay.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A job run on every tick of a periodic timer.
pub type RepeatingJob = Box<dyn Fn() + Send + Sync + 'static>;

/// Registers delayed and recurring callbacks.
///
/// Jobs run outside any dispatch in progress and must only touch
/// state they own, or go through the zone manager.
pub trait Scheduler: Send + Sync {
    /// Run `job` every `interval`, starting one interval from now.
    fn every(&self, interval: Duration, job: RepeatingJob) -> TimerId;

    /// Run `job` once after `delay`.
    fn after(&self, delay: Duration, job: Job) -> TimerId;

    /// Cancel a pending timer.
    ///
    /// Returns `false` when the timer already fired (one-shot) or was
    /// already cancelled. Cancelling twice is a no-op.
    fn cancel(&self, id: TimerId) -> bool;
}
