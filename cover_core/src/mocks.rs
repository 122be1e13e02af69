//! Test and helper mocks for cover_core

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cover_traits::{Clock, Transport};

/// Deterministic clock whose time only moves when advanced.
///
/// now() = origin + offset
/// sleep(d) advances internal time by d without actually sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Advance the clock by fractional seconds.
    pub fn advance_secs(&self, s: f64) {
        self.advance(crate::util::secs(s));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin + off
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[derive(Debug, Default)]
struct Recorded {
    sent: Vec<Vec<u8>>,
    failing: bool,
    attempts: usize,
}

/// Transport that records every packet and can be told to fail.
///
/// Clones share the same log, so a test keeps one handle after moving the
/// other into a cover.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Rc<RefCell<Recorded>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every send fails with an I/O error and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.inner.borrow_mut().failing = failing;
    }

    /// Packets successfully sent, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.inner.borrow().sent.clone()
    }

    /// Number of send attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.inner.borrow().attempts
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, packet: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.borrow_mut();
        inner.attempts += 1;
        if inner.failing {
            return Err(Box::new(std::io::Error::other("recording transport: send failed")));
        }
        inner.sent.push(packet.to_vec());
        Ok(())
    }
}
