//! In-process timer queue implementing `cover_traits::Scheduler`.
//!
//! Registrations live in a small mutex-guarded list; the owner polls
//! `next_deadline()` and pulls firings one at a time with `pop_due()`, so a
//! cancellation issued while handling one firing is honoured for the next.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use cover_traits::{Fired, Scheduler, TimerHandle, TimerId};

#[derive(Debug)]
struct Entry {
    handle: TimerHandle,
    timer: TimerId,
    deadline: Instant,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
}

#[derive(Default)]
pub struct TimerQueue {
    inner: Mutex<Inner>,
}

impl core::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn register(&self, deadline: Instant, period: Option<Duration>, timer: TimerId) -> TimerHandle {
        let mut inner = self.lock();
        inner.next_id = inner.next_id.wrapping_add(1);
        let handle = TimerHandle::new(inner.next_id);
        inner.entries.push(Entry {
            handle,
            timer,
            deadline,
            period,
        });
        handle
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.lock().entries.iter().map(|e| e.deadline).min()
    }

    /// Pop the earliest firing due at or before `now`.
    ///
    /// Ties are broken by registration order. Periodic entries are re-armed at
    /// `deadline + period`; one-shot entries are removed.
    pub fn pop_due(&self, now: Instant) -> Option<Fired> {
        let mut inner = self.lock();
        let idx = inner
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.handle))
            .map(|(i, _)| i)?;

        let entry = &mut inner.entries[idx];
        let fired = Fired {
            handle: entry.handle,
            timer: entry.timer,
            at: entry.deadline,
        };
        match entry.period {
            Some(period) => entry.deadline += period,
            None => {
                inner.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Scheduler for TimerQueue {
    fn at(&self, when: Instant, timer: TimerId) -> TimerHandle {
        self.register(when, None, timer)
    }

    fn every(&self, first: Instant, interval: Duration, timer: TimerId) -> TimerHandle {
        // A zero period would re-fire forever at the same instant.
        let interval = interval.max(Duration::from_millis(1));
        self.register(first, Some(interval), timer)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.lock().entries.retain(|e| e.handle != handle);
    }
}
