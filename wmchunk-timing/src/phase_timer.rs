//! Deadline-based blocking waits on a per-trial clock.

use std::time::Duration;

use crate::Timer;

/// A point on the trial timeline computed once from `now + duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Duration,
}

impl Deadline {
    pub fn after<T: Timer>(timer: &T, duration: Duration) -> Self {
        Self {
            at: timer.now() + duration,
        }
    }

    pub fn at(&self) -> Duration {
        self.at
    }

    pub fn expired<T: Timer>(&self, timer: &T) -> bool {
        timer.now() >= self.at
    }

    pub fn remaining<T: Timer>(&self, timer: &T) -> Duration {
        self.at.saturating_sub(timer.now())
    }
}

/// Holds the caller until a duration has elapsed on the trial clock.
///
/// Input is never polled while waiting.
pub struct PhaseTimer<'t, T: Timer> {
    timer: &'t T,
}

impl<'t, T: Timer> PhaseTimer<'t, T> {
    pub fn new(timer: &'t T) -> Self {
        Self { timer }
    }

    /// Blocks until `duration` has passed, returning the deadline reached.
    pub fn wait(&self, duration: Duration) -> Deadline {
        let deadline = Deadline::after(self.timer, duration);
        self.wait_until(deadline);
        deadline
    }

    pub fn wait_until(&self, deadline: Deadline) {
        while !deadline.expired(self.timer) {
            self.timer.sleep(deadline.remaining(self.timer));
        }
    }
}

/// Converts a duration in seconds from a trial file into a `Duration`.
///
/// Negative, NaN and infinite values are rejected.
pub fn secs(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}
