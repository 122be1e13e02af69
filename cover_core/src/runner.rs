use std::time::Instant;

use cover_traits::Clock;

use crate::cover::Cover;
use crate::timers::TimerQueue;

/// Deliver timer firings from `queue` to `cover`, sleeping on `clock` between deadlines.
///
/// Returns once the queue is empty, or once `until` is reached when given (the
/// clock is then advanced to `until`). Returns the number of firings delivered.
///
/// With a real clock this blocks for the remaining travel time; tests and the
/// CLI's fast mode pass a `ManualClock`, where sleeping only moves time forward.
pub fn drive(
    cover: &mut Cover,
    queue: &TimerQueue,
    clock: &dyn Clock,
    until: Option<Instant>,
) -> usize {
    drive_with(cover, queue, clock, until, |_| {})
}

/// Like `drive`, calling `after_each` once per delivered firing.
pub fn drive_with<F>(
    cover: &mut Cover,
    queue: &TimerQueue,
    clock: &dyn Clock,
    until: Option<Instant>,
    mut after_each: F,
) -> usize
where
    F: FnMut(&Cover),
{
    let mut delivered = 0usize;
    while let Some(deadline) = queue.next_deadline() {
        if until.is_some_and(|limit| deadline > limit) {
            break;
        }
        clock.sleep_until(deadline);
        while let Some(fired) = queue.pop_due(clock.now()) {
            cover.handle_timer(fired);
            delivered += 1;
            after_each(cover);
        }
    }
    if let Some(limit) = until {
        clock.sleep_until(limit);
    }
    tracing::trace!(cover = %cover.unique_id(), delivered, "timers drained");
    delivered
}
