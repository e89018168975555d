//! Clock port: the current time, injectable for tests.

use chrono::NaiveTime;

use zonehub_domain::time::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Local wall-clock time, used to evaluate activity windows.
    fn local_time(&self) -> NaiveTime {
        self.now().with_timezone(&chrono::Local).time()
    }
}
