use std::time::{Duration, Instant};

/// Time source for travel estimation and timer delivery.
///
/// Travel positions are derived purely from elapsed time, so everything that
/// reads "now" goes through this trait. Simulated clocks advance on `sleep`
/// instead of blocking.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Block until `deadline`. A deadline already in the past returns at once.
    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(self.now());
        if !remaining.is_zero() {
            self.sleep(remaining);
        }
    }
}

/// Wall-clock backed by `Instant::now()` and `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}
