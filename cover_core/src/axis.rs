//! Command vocabulary of one axis on top of its `TravelEstimator`.
//!
//! Every command is fire-and-forget: the packet goes out first and the
//! estimator is only touched once the transport accepted it. Each method
//! returns whether the cover should publish a state change.

use std::sync::Arc;

use cover_traits::{AxisKind, Clock, Fired, Scheduler, TimerHandle, TimerKind, Transport};

use crate::config::{AxisCfg, AxisCommands, Capabilities};
use crate::estimator::TravelEstimator;
use crate::status::{CoverStatus, Direction};
use crate::transport_error::map_transport_error;
use crate::util::{POSITION_MAX, POSITION_MIN, clamp_position};

pub struct AxisController {
    name: String,
    commands: AxisCommands,
    caps: Capabilities,
    estimator: TravelEstimator,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for AxisController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AxisController")
            .field("name", &self.name)
            .field("caps", &self.caps)
            .field("estimator", &self.estimator)
            .finish()
    }
}

impl AxisController {
    pub fn new(
        axis: AxisKind,
        name: impl Into<String>,
        cfg: &AxisCfg,
        scheduler: Arc<dyn Scheduler + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let name = name.into();
        Self {
            estimator: TravelEstimator::new(axis, name.clone(), cfg, scheduler),
            caps: Capabilities::from_axis(cfg),
            commands: cfg.commands.clone(),
            name,
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn estimator(&self) -> &TravelEstimator {
        &self.estimator
    }

    /// Estimated position; never measured.
    pub fn position(&self) -> Option<u8> {
        self.estimator.position()
    }

    pub fn status(&self) -> Option<CoverStatus> {
        self.estimator.status()
    }

    pub fn open<T: Transport + ?Sized>(&mut self, transport: &mut T) -> bool {
        tracing::info!(axis = %self.name, "opening");
        self.traverse(transport, Direction::Opening, Direction::Opening.end_stop())
    }

    pub fn close<T: Transport + ?Sized>(&mut self, transport: &mut T) -> bool {
        tracing::info!(axis = %self.name, "closing");
        self.traverse(transport, Direction::Closing, Direction::Closing.end_stop())
    }

    /// Send the stop packet and freeze the estimate.
    pub fn hold<T: Transport + ?Sized>(&mut self, transport: &mut T) -> bool {
        let Some(packet) = self.commands.stop.as_deref() else {
            return false;
        };
        if !self.send(transport, packet, "stop") {
            return false;
        }
        let now = self.clock.now();
        self.estimator.stop(now);
        tracing::info!(axis = %self.name, position = ?self.estimator.position(), "stopped");
        true
    }

    /// Move toward `target` (rounded and clamped into `[0, 100]`).
    ///
    /// The end stops delegate to `open`/`close`. Mid-traverse, the direction
    /// is chosen from the estimate at `now`, not the last tick, and a traverse
    /// that is already at the target is stopped there. With an unknown
    /// position, or when idle at the target, nothing is sent but the cover
    /// still publishes its unchanged state.
    pub fn goto<T: Transport + ?Sized>(&mut self, transport: &mut T, target: f64) -> bool {
        let Some(target) = clamp_position(target) else {
            tracing::warn!(axis = %self.name, target, "ignoring non-finite target");
            return false;
        };
        match target {
            POSITION_MIN => return self.close(transport),
            POSITION_MAX => return self.open(transport),
            _ => {}
        }
        let Some(position) = self.estimator.position_at(self.clock.now()) else {
            return true;
        };
        if position == target {
            if self.estimator.is_travelling() {
                return self.hold(transport);
            }
            return true;
        }

        tracing::info!(axis = %self.name, from = position, to = target, "setting position");
        let direction = if target < position {
            Direction::Closing
        } else {
            Direction::Opening
        };
        self.traverse(transport, direction, target)
    }

    /// Route a scheduler firing. Stale firings are dropped.
    pub fn on_timer<T: Transport + ?Sized>(&mut self, transport: &mut T, fired: &Fired) -> bool {
        match fired.timer.kind {
            TimerKind::Tick => self.on_tick(fired),
            TimerKind::EndOfTravel => self.on_end_of_travel(transport, fired),
        }
    }

    pub fn on_tick(&mut self, fired: &Fired) -> bool {
        if !self.is_current(fired.handle) {
            return false;
        }
        self.estimator.tick(fired.at);
        true
    }

    /// Settle the traverse. An intermediate target also gets the stop packet
    /// so the actuator halts there.
    pub fn on_end_of_travel<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        fired: &Fired,
    ) -> bool {
        if !self.is_current(fired.handle) {
            return false;
        }
        let intermediate = self
            .estimator
            .position_set()
            .is_some_and(|p| p != POSITION_MIN && p != POSITION_MAX);
        if intermediate {
            if let Some(packet) = self.commands.stop.as_deref() {
                // A failed stop is logged by `send`; the estimate settles regardless.
                let _ = self.send(transport, packet, "stop");
            }
        }
        self.estimator.end_traverse(fired.at);
        true
    }

    pub fn restore(&mut self, state: &str, position: Option<u8>) {
        self.estimator.restore(state, position);
    }

    fn is_current(&self, handle: TimerHandle) -> bool {
        let live = self.estimator.is_live(handle);
        if !live {
            tracing::trace!(axis = %self.name, handle = handle.raw(), "stale timer ignored");
        }
        live
    }

    fn traverse<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        direction: Direction,
        target: u8,
    ) -> bool {
        let (packet, command) = match direction {
            Direction::Opening => (self.commands.open.as_deref(), "open"),
            Direction::Closing => (self.commands.close.as_deref(), "close"),
        };
        let Some(packet) = packet else {
            return false;
        };
        if !self.send(transport, packet, command) {
            return false;
        }
        let now = self.clock.now();
        self.estimator.begin_traverse(direction, target, now);
        true
    }

    fn send<T: Transport + ?Sized>(&self, transport: &mut T, packet: &[u8], command: &str) -> bool {
        match transport.send(packet) {
            Ok(()) => true,
            Err(e) => {
                let err = map_transport_error(&*e);
                tracing::warn!(axis = %self.name, command, error = %err, "failed to send packet");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ManualClock, RecordingTransport};
    use crate::timers::TimerQueue;
    use std::time::Duration;

    struct Rig {
        axis: AxisController,
        queue: Arc<TimerQueue>,
        clock: ManualClock,
        tx: RecordingTransport,
    }

    fn rig() -> Rig {
        let clock = ManualClock::new();
        let queue = Arc::new(TimerQueue::new());
        let cfg = AxisCfg {
            commands: AxisCommands {
                open: Some(vec![1]),
                close: Some(vec![2]),
                stop: Some(vec![3]),
            },
            opening_time_s: 10.0,
            closing_time_s: 10.0,
        };
        let axis = AxisController::new(
            AxisKind::Main,
            "bedroom",
            &cfg,
            queue.clone(),
            Arc::new(clock.clone()),
        );
        Rig {
            axis,
            queue,
            clock,
            tx: RecordingTransport::new(),
        }
    }

    #[test]
    fn goto_with_unknown_position_sends_nothing() {
        let mut r = rig();
        assert!(r.axis.goto(&mut r.tx, 40.0));
        assert!(r.tx.sent().is_empty());
        assert!(r.queue.is_empty());
    }

    #[test]
    fn goto_extremes_delegate_to_open_and_close() {
        let mut r = rig();
        assert!(r.axis.goto(&mut r.tx, 0.4));
        assert_eq!(r.tx.sent(), vec![vec![2]]);
        assert_eq!(r.axis.status(), Some(CoverStatus::Closing));
    }

    #[test]
    fn intermediate_end_sends_stop() {
        let mut r = rig();
        r.axis.restore("open", Some(20));
        assert!(r.axis.goto(&mut r.tx, 50.0));

        while let Some(deadline) = r.queue.next_deadline() {
            r.clock.sleep_until(deadline);
            while let Some(fired) = r.queue.pop_due(r.clock.now()) {
                r.axis.on_timer(&mut r.tx, &fired);
            }
        }
        assert_eq!(r.tx.sent(), vec![vec![1], vec![3]]);
        assert_eq!(r.axis.position(), Some(50));
        assert_eq!(r.axis.status(), Some(CoverStatus::Opened));
    }

    #[test]
    fn failed_send_leaves_estimate_untouched() {
        let mut r = rig();
        r.axis.restore("open", Some(60));
        r.tx.set_failing(true);
        assert!(!r.axis.close(&mut r.tx));
        assert!(!r.axis.hold(&mut r.tx));
        assert!(!r.axis.goto(&mut r.tx, 30.0));
        assert_eq!(r.tx.attempts(), 3);
        assert_eq!(r.axis.status(), Some(CoverStatus::Opened));
        assert_eq!(r.axis.position(), Some(60));
        assert!(r.queue.is_empty());
    }

    #[test]
    fn superseded_end_of_travel_is_ignored() {
        let mut r = rig();
        r.axis.restore("open", Some(50));
        let t0 = r.clock.now();
        r.axis.open(&mut r.tx);
        let (_, first_end) = r.axis.estimator().timers();
        let stale = Fired {
            handle: first_end.expect("end timer"),
            timer: cover_traits::TimerId::end_of_travel(AxisKind::Main),
            at: t0 + Duration::from_secs(5),
        };
        r.clock.advance(Duration::from_secs(1));
        r.axis.close(&mut r.tx);

        assert!(!r.axis.on_timer(&mut r.tx, &stale));
        assert_eq!(r.axis.status(), Some(CoverStatus::Closing));
    }
}
