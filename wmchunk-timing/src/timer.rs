use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic per-trial clock.
///
/// `now` is measured from the last `reset`, so every trial reads its own
/// timeline starting at zero.
pub trait Timer {
    fn now(&self) -> Duration;
    fn reset(&mut self);
    fn sleep(&self, d: Duration);
}

/// Wall-clock timer backed by `Instant` with an OS-level precise sleep.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
    fn reset(&mut self) {
        self.start = Instant::now();
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // SAFETY: `req` is a valid timespec and the remainder pointer may be null.
        let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut()) };
        if rc != 0 {
            // interrupted; the deadline loop in PhaseTimer picks up the rest
            tracing::trace!(rc, "clock_nanosleep returned early");
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated clock: `sleep` advances time instantly.
///
/// Clones share the same timeline, so an input script and the scheduler can
/// observe one clock. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    origin_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Total simulated time, ignoring resets.
    pub fn absolute(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Duration {
        let now = self.now_ns.load(Ordering::SeqCst);
        let origin = self.origin_ns.load(Ordering::SeqCst);
        Duration::from_nanos(now.saturating_sub(origin))
    }
    fn reset(&mut self) {
        self.origin_ns
            .store(self.now_ns.load(Ordering::SeqCst), Ordering::SeqCst);
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_reset_rebases_now() {
        let mut t = ManualTimer::new();
        t.sleep(Duration::from_millis(1500));
        assert_eq!(t.now(), Duration::from_millis(1500));

        t.reset();
        assert_eq!(t.now(), Duration::ZERO);
        t.sleep(Duration::from_millis(250));
        assert_eq!(t.now(), Duration::from_millis(250));
        assert_eq!(t.absolute(), Duration::from_millis(1750));
    }

    #[test]
    fn manual_timer_clones_share_timeline() {
        let t = ManualTimer::new();
        let other = t.clone();
        other.advance(Duration::from_secs(2));
        assert_eq!(t.now(), Duration::from_secs(2));
    }

    #[test]
    fn high_precision_timer_sleeps_at_least_requested() {
        let mut t = HighPrecisionTimer::new();
        t.reset();
        t.sleep(Duration::from_millis(5));
        assert!(t.now() >= Duration::from_millis(5));
    }
}
