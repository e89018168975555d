//! [`Scheduler`] implementations.
//!
//! - [`TokioScheduler`] spawns one tokio task per timer and aborts it on
//!   cancellation.
//! - [`ManualScheduler`] keeps timers in memory and runs them when
//!   [`ManualScheduler::advance`] moves its virtual time forward.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use zonehub_domain::id::TimerId;

use crate::ports::{Job, RepeatingJob, Scheduler};

type Tasks = Arc<Mutex<HashMap<TimerId, JoinHandle<()>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scheduler backed by tokio tasks.
pub struct TokioScheduler {
    handle: Handle,
    tasks: Tasks,
}

impl TokioScheduler {
    /// Create a scheduler spawning on the given runtime.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Arc::default(),
        }
    }

    /// Create a scheduler spawning on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Number of timers that are still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// Abort every pending timer.
    pub fn shutdown(&self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.abort();
        }
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, interval: Duration, job: RepeatingJob) -> TimerId {
        let id = TimerId::new();
        let mut tasks = lock(&self.tasks);
        let task = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                job();
            }
        });
        tasks.insert(id, task);
        tracing::debug!(%id, ?interval, "periodic timer registered");
        id
    }

    fn after(&self, delay: Duration, job: Job) -> TimerId {
        let id = TimerId::new();
        let registry = Arc::clone(&self.tasks);
        // Held until the handle is stored so the task cannot deregister first.
        let mut tasks = lock(&self.tasks);
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&registry).remove(&id);
            job();
        });
        tasks.insert(id, task);
        tracing::debug!(%id, ?delay, "one-shot timer registered");
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        match lock(&self.tasks).remove(&id) {
            Some(task) => {
                task.abort();
                tracing::debug!(%id, "timer cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

enum ManualJob {
    Once(Job),
    Every(Arc<dyn Fn() + Send + Sync>, Duration),
}

struct ManualTimer {
    due: Duration,
    seq: u64,
    job: ManualJob,
}

#[derive(Default)]
struct ManualState {
    elapsed: Duration,
    seq: u64,
    timers: HashMap<TimerId, ManualTimer>,
}

/// Deterministic scheduler driven by [`advance`](Self::advance).
///
/// Timers fire in due-time order, ties in registration order. Jobs run on
/// the caller's thread with the scheduler unlocked, so they may register
/// or cancel timers themselves.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        lock(&self.state).elapsed
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.state).timers.len()
    }

    /// Move virtual time forward by `by`, running every timer that
    /// becomes due. Returns the number of jobs run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = lock(&self.state).elapsed + by;
        let mut ran = 0;
        while let Some(job) = self.next_due(target) {
            match job {
                ManualJob::Once(job) => job(),
                ManualJob::Every(job, _) => job(),
            }
            ran += 1;
        }
        lock(&self.state).elapsed = target;
        ran
    }

    fn next_due(&self, target: Duration) -> Option<ManualJob> {
        let mut state = lock(&self.state);
        let (id, due) = state
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= target)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(id, timer)| (*id, timer.due))?;
        state.elapsed = due;

        let timer = state.timers.get_mut(&id)?;
        if let ManualJob::Every(job, interval) = &timer.job {
            let job = Arc::clone(job);
            let interval = *interval;
            timer.due += interval;
            return Some(ManualJob::Every(job, interval));
        }
        state.timers.remove(&id).map(|timer| timer.job)
    }

    fn insert(&self, due_in: Duration, job: ManualJob) -> TimerId {
        let id = TimerId::new();
        let mut state = lock(&self.state);
        state.seq += 1;
        let timer = ManualTimer {
            due: state.elapsed + due_in,
            seq: state.seq,
            job,
        };
        state.timers.insert(id, timer);
        id
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, interval: Duration, job: RepeatingJob) -> TimerId {
        self.insert(interval, ManualJob::Every(Arc::from(job), interval))
    }

    fn after(&self, delay: Duration, job: Job) -> TimerId {
        self.insert(delay, ManualJob::Once(job))
    }

    fn cancel(&self, id: TimerId) -> bool {
        lock(&self.state).timers.remove(&id).is_some()
    }
}
