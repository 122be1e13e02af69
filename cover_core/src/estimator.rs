//! Per-axis travel estimator (`TravelEstimator`).
//!
//! IR/RF actuators never report where they are, so the position is *always an
//! estimate* derived from elapsed time and the calibrated travel speed. The
//! estimator owns the status, the estimated position, and the two scheduler
//! registrations of an in-progress traverse (end-of-travel, plus a periodic
//! tick for traverses long enough to be worth refreshing).
//!
//! All operations are synchronous and take `now` explicitly; nothing in here
//! reads a clock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cover_traits::{AxisKind, Scheduler, TimerHandle, TimerId};

use crate::config::AxisCfg;
use crate::status::{CoverStatus, Direction};
use crate::util::{POSITION_MAX, POSITION_MIN, clamp_position, secs, speed_for};

/// Refresh period of the position while travelling.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Traverses at or below this many seconds get no periodic tick.
pub const TICK_MIN_TRAVEL_S: f64 = 2.0;

pub struct TravelEstimator {
    axis: AxisKind,
    label: String,
    opening_time_s: f64,
    closing_time_s: f64,
    opening_speed: f64,
    closing_speed: f64,
    scheduler: Arc<dyn Scheduler + Send + Sync>,

    status: Option<CoverStatus>,
    position: Option<u8>,
    position_set: Option<u8>,
    // Present iff a traverse is in progress (together with `end_timer`).
    position_start: Option<u8>,
    travel_start: Option<Instant>,
    travel_end: Option<Instant>,
    // Signed: positive while opening, negative while closing.
    speed: f64,
    tick_timer: Option<TimerHandle>,
    end_timer: Option<TimerHandle>,
}

impl core::fmt::Debug for TravelEstimator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TravelEstimator")
            .field("label", &self.label)
            .field("status", &self.status)
            .field("position", &self.position)
            .field("position_set", &self.position_set)
            .field("position_start", &self.position_start)
            .field("speed", &self.speed)
            .finish()
    }
}

impl TravelEstimator {
    pub fn new(
        axis: AxisKind,
        label: impl Into<String>,
        cfg: &AxisCfg,
        scheduler: Arc<dyn Scheduler + Send + Sync>,
    ) -> Self {
        Self {
            axis,
            label: label.into(),
            opening_time_s: cfg.opening_time_s,
            closing_time_s: cfg.closing_time_s,
            opening_speed: speed_for(cfg.opening_time_s),
            closing_speed: -speed_for(cfg.closing_time_s),
            scheduler,
            status: None,
            position: None,
            position_set: None,
            position_start: None,
            travel_start: None,
            travel_end: None,
            speed: 0.0,
            tick_timer: None,
            end_timer: None,
        }
    }

    pub fn status(&self) -> Option<CoverStatus> {
        self.status
    }

    /// Estimated position in `[0, 100]`; `None` until first known.
    pub fn position(&self) -> Option<u8> {
        self.position
    }

    /// Target of the current or most recent traverse.
    pub fn position_set(&self) -> Option<u8> {
        self.position_set
    }

    pub fn position_start(&self) -> Option<u8> {
        self.position_start
    }

    pub fn travel_start(&self) -> Option<Instant> {
        self.travel_start
    }

    pub fn travel_end(&self) -> Option<Instant> {
        self.travel_end
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Estimate at `now` without touching state or timers.
    pub fn position_at(&self, now: Instant) -> Option<u8> {
        match (self.position_start, self.travel_start) {
            (Some(start), Some(t0)) => {
                let elapsed_s = now.saturating_duration_since(t0).as_secs_f64();
                let delta = (elapsed_s * self.speed).round_ties_even();
                clamp_position(f64::from(start) + delta)
            }
            _ => self.position,
        }
    }

    pub fn is_travelling(&self) -> bool {
        self.end_timer.is_some()
    }

    /// Live registrations as `(tick, end_of_travel)`.
    pub fn timers(&self) -> (Option<TimerHandle>, Option<TimerHandle>) {
        (self.tick_timer, self.end_timer)
    }

    /// Whether `handle` belongs to the current traverse.
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.tick_timer == Some(handle) || self.end_timer == Some(handle)
    }

    /// Start a traverse toward `target`, reconciling any traverse in progress first.
    pub fn begin_traverse(&mut self, direction: Direction, target: u8, now: Instant) {
        self.reconcile(now);

        let target = target.min(POSITION_MAX);
        self.speed = match direction {
            Direction::Opening => self.opening_speed,
            Direction::Closing => self.closing_speed,
        };

        let (start, travel_s) = match self.position {
            // Unknown position: assume the far end and use the full configured time.
            None => (
                direction.assumed_start(),
                match direction {
                    Direction::Opening => self.opening_time_s,
                    Direction::Closing => self.closing_time_s,
                },
            ),
            Some(p) => (
                p,
                (f64::from(target) - f64::from(p)).abs() / self.speed.abs(),
            ),
        };

        let travel_end = now + secs(travel_s);
        self.position_start = Some(start);
        self.position_set = Some(target);
        self.travel_start = Some(now);
        self.travel_end = Some(travel_end);
        self.status = Some(direction.into());

        self.end_timer = Some(
            self.scheduler
                .at(travel_end, TimerId::end_of_travel(self.axis)),
        );
        if travel_s > TICK_MIN_TRAVEL_S {
            self.tick_timer = Some(
                self.scheduler
                    .every(now + TICK_INTERVAL, TICK_INTERVAL, TimerId::tick(self.axis)),
            );
        }

        tracing::debug!(
            axis = %self.label,
            from = start,
            to = target,
            travel_s,
            "traverse started"
        );
    }

    /// Bring the estimate up to `now` and tear down the traverse timers.
    ///
    /// Returns false (and changes nothing) when no traverse is in progress.
    /// The status is left as is; `stop`, `end_traverse` and `begin_traverse`
    /// settle it.
    pub fn reconcile(&mut self, now: Instant) -> bool {
        if !self.is_travelling() {
            return false;
        }
        self.update_position(now);
        self.cancel_timers();
        self.position_start = None;
        self.travel_start = None;
        self.travel_end = None;
        true
    }

    /// Periodic refresh while travelling.
    pub fn tick(&mut self, now: Instant) {
        self.update_position(now);
    }

    /// Natural end of a traverse.
    pub fn end_traverse(&mut self, now: Instant) {
        let elapsed_s = self
            .travel_start
            .map(|t0| now.saturating_duration_since(t0).as_secs_f64());
        self.reconcile(now);

        // Snap to the end stops to remove rounding residue.
        if matches!(self.position_set, Some(POSITION_MIN) | Some(POSITION_MAX)) {
            self.position = self.position_set;
        }
        self.position_start = None;
        self.status = Some(CoverStatus::settled_at(self.position));

        tracing::debug!(
            axis = %self.label,
            position = ?self.position,
            elapsed_s = ?elapsed_s,
            "traverse ended"
        );
    }

    /// Explicit stop: freeze at the current estimate.
    pub fn stop(&mut self, now: Instant) {
        self.reconcile(now);
        self.position_set = self.position;
        self.position_start = None;
        self.status = Some(CoverStatus::settled_at(self.position));
        tracing::debug!(axis = %self.label, position = ?self.position, "stopped");
    }

    /// One-time initialization from persisted state. Never starts a traverse.
    pub fn restore(&mut self, state: &str, saved_position: Option<u8>) {
        if self.position.is_none() {
            self.position = saved_position.map(|p| p.min(POSITION_MAX));
            self.position_set = self.position;
        }
        self.status = match state {
            "opening" => Some(CoverStatus::Opening),
            "closing" => Some(CoverStatus::Closing),
            "closed" => Some(CoverStatus::Closed),
            _ => self.position.map(|_| CoverStatus::Opened),
        };
        tracing::debug!(
            axis = %self.label,
            state,
            position = ?self.position,
            "restored"
        );
    }

    fn update_position(&mut self, now: Instant) {
        if self.position_start.is_none() || self.travel_start.is_none() {
            return;
        }
        self.position = self.position_at(now);
        tracing::trace!(axis = %self.label, position = ?self.position, "position update");
    }

    fn cancel_timers(&mut self) {
        if let Some(h) = self.tick_timer.take() {
            self.scheduler.cancel(h);
        }
        if let Some(h) = self.end_timer.take() {
            self.scheduler.cancel(h);
        }
    }
}

impl Drop for TravelEstimator {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}
