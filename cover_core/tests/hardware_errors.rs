#![cfg(feature = "hardware-errors")]

use std::sync::Arc;

use cover_core::mocks::ManualClock;
use cover_core::transport_error::map_transport_error;
use cover_core::{AxisCfg, AxisCommands, Cover, CoverCfg, CoverError, TimerQueue};
use cover_hardware::SimulatedTransport;
use cover_traits::Transport;
use rstest::rstest;

fn cover_on(tx: &SimulatedTransport) -> (Cover, Arc<TimerQueue>) {
    let clock = ManualClock::new();
    let queue = Arc::new(TimerQueue::new());
    let cover = Cover::builder()
        .with_transport(tx.clone())
        .with_config(CoverCfg {
            name: "Porch".into(),
            main: AxisCfg {
                commands: AxisCommands {
                    open: Some(vec![1]),
                    close: Some(vec![2]),
                    stop: Some(vec![3]),
                },
                opening_time_s: 15.0,
                closing_time_s: 15.0,
            },
            ..CoverCfg::default()
        })
        .with_scheduler(queue.clone())
        .with_clock(Arc::new(clock))
        .build()
        .expect("valid cover");
    (cover, queue)
}

#[rstest]
fn offline_blaster_is_unavailable_and_inert() {
    let tx = SimulatedTransport::new();
    let (mut cover, queue) = cover_on(&tx);
    tx.set_available(false);

    cover.open();
    assert!(!cover.available());
    assert!(!cover.snapshot().available);
    assert_eq!(cover.status(), None);
    assert!(queue.is_empty());
}

#[rstest]
fn timeout_then_retry_by_caller() {
    let tx = SimulatedTransport::new();
    let (mut cover, queue) = cover_on(&tx);
    tx.fail_next(1);

    cover.close();
    assert_eq!(cover.status(), None);
    cover.close();
    assert!(cover.is_closing());
    assert_eq!(tx.sent(), vec![vec![2]]);
    assert_eq!(queue.len(), 2);
}

#[rstest]
fn simulated_errors_map_to_typed_variants() {
    let mut tx = SimulatedTransport::new();
    tx.fail_next(1);
    let e = tx.send(&[0]).expect_err("timeout");
    assert!(matches!(map_transport_error(&*e), CoverError::Timeout));

    tx.set_available(false);
    let e = tx.send(&[0]).expect_err("offline");
    assert!(matches!(map_transport_error(&*e), CoverError::TransportFault(_)));
}
