pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::{Duration, Instant};

/// Fire-and-forget packet transport (IR/RF blaster).
///
/// A successful `send` only means the packet left the host; the actuator
/// never acknowledges it.
pub trait Transport {
    fn send(&mut self, packet: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Whether the device behind this transport is currently reachable.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, packet: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).send(packet)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Which half of a cover a timer or a saved state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Main,
    Tilt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Periodic position refresh while travelling.
    Tick,
    /// One-shot deadline at the computed end of a traverse.
    EndOfTravel,
}

/// Identifies what a timer firing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub axis: AxisKind,
    pub kind: TimerKind,
}

impl TimerId {
    pub fn tick(axis: AxisKind) -> Self {
        Self {
            axis,
            kind: TimerKind::Tick,
        }
    }

    pub fn end_of_travel(axis: AxisKind) -> Self {
        Self {
            axis,
            kind: TimerKind::EndOfTravel,
        }
    }
}

/// Opaque handle returned by a `Scheduler` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A timer firing delivered back to the owner of the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub timer: TimerId,
    /// Scheduled deadline of this firing.
    pub at: Instant,
}

/// Scheduling primitives: "at or after a point in time" and "every interval".
///
/// Implementations deliver each registration's firings in non-decreasing time
/// order. `cancel` is idempotent and cancelling a timer that already fired is a no-op.
pub trait Scheduler {
    fn at(&self, when: Instant, timer: TimerId) -> TimerHandle;
    /// Periodic firings at `first`, then every `interval` after it.
    fn every(&self, first: Instant, interval: Duration, timer: TimerId) -> TimerHandle;
    fn cancel(&self, handle: TimerHandle);
}

/// Last known state of one axis as persisted by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedAxis {
    /// State label, e.g. "open", "closed", "opening", "closing".
    pub state: String,
    pub position: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedCover {
    pub main: SavedAxis,
    pub tilt: SavedAxis,
}

/// Supplies the last known state of a cover once, at startup.
pub trait RestoreSource {
    fn last_state(&self, cover_id: &str) -> Option<SavedCover>;
}
