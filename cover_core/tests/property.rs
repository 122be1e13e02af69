use std::sync::Arc;
use std::time::Duration;

use cover_core::mocks::{ManualClock, RecordingTransport};
use cover_core::runner::drive;
use cover_core::util::secs;
use cover_core::{AxisCfg, AxisCommands, Cover, CoverCfg, Direction, TimerQueue, TravelEstimator};
use cover_traits::{AxisKind, Clock, SavedAxis, SavedCover};
use proptest::prelude::*;

fn axis(opening: f64, closing: f64) -> AxisCfg {
    AxisCfg {
        commands: AxisCommands {
            open: Some(vec![1]),
            close: Some(vec![2]),
            stop: Some(vec![3]),
        },
        opening_time_s: opening,
        closing_time_s: closing,
    }
}

fn estimator(opening: f64, closing: f64) -> (TravelEstimator, Arc<TimerQueue>, ManualClock) {
    let clock = ManualClock::new();
    let queue = Arc::new(TimerQueue::new());
    let est = TravelEstimator::new(AxisKind::Main, "prop", &axis(opening, closing), queue.clone());
    (est, queue, clock)
}

fn cover(opening: f64, closing: f64) -> (Cover, Arc<TimerQueue>, ManualClock) {
    let clock = ManualClock::new();
    let queue = Arc::new(TimerQueue::new());
    let cover = Cover::builder()
        .with_transport(RecordingTransport::new())
        .with_config(CoverCfg {
            name: "prop".into(),
            main: axis(opening, closing),
            ..CoverCfg::default()
        })
        .with_scheduler(queue.clone())
        .with_clock(Arc::new(clock.clone()))
        .build()
        .expect("valid cover");
    (cover, queue, clock)
}

proptest! {
    #[test]
    fn full_open_reaches_100_at_opening_time(millis in 1u64..=300_000) {
        let opening = millis as f64 / 1000.0;
        let (mut est, _queue, clock) = estimator(opening, 10.0);
        est.restore("closed", Some(0));
        let t0 = clock.now();
        est.begin_traverse(Direction::Opening, 100, t0);
        est.tick(t0 + secs(opening));
        prop_assert_eq!(est.position(), Some(100));
    }

    #[test]
    fn goto_lands_exactly_on_target(
        from in 1u8..100,
        to in 1u8..100,
        opening in 1.0f64..120.0,
        closing in 1.0f64..120.0,
    ) {
        prop_assume!(from != to);
        let (mut cover, queue, clock) = cover(opening, closing);
        cover.restore(&SavedCover {
            main: SavedAxis { state: "open".into(), position: Some(from) },
            tilt: SavedAxis::default(),
        });
        cover.set_position(f64::from(to));
        drive(&mut cover, &queue, &clock, None);
        prop_assert_eq!(cover.current_position(), Some(to));
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn reconcile_twice_at_same_instant_is_stable(
        start in 0u8..=100,
        elapsed_ms in 0u64..20_000,
    ) {
        let (mut est, queue, clock) = estimator(10.0, 10.0);
        est.restore("open", Some(start));
        let t0 = clock.now();
        est.begin_traverse(Direction::Closing, 0, t0);
        let t = t0 + Duration::from_millis(elapsed_ms);
        let travelling = est.is_travelling();

        prop_assert_eq!(est.reconcile(t), travelling);
        let first = est.position();
        prop_assert!(!est.reconcile(t));
        prop_assert_eq!(est.position(), first);
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn interrupting_leaves_one_live_traverse(
        start in 0u8..=100,
        elapsed_ms in 0u64..10_000,
    ) {
        let (mut est, queue, clock) = estimator(10.0, 8.0);
        est.restore("open", Some(start));
        let t0 = clock.now();
        est.begin_traverse(Direction::Opening, 100, t0);
        clock.advance(Duration::from_millis(elapsed_ms));
        est.begin_traverse(Direction::Closing, 0, clock.now());

        let (tick, end) = est.timers();
        prop_assert!(end.is_some());
        prop_assert_eq!(queue.len(), 1 + usize::from(tick.is_some()));
        prop_assert_eq!(est.position_start(), est.position());
    }
}
