use std::sync::Arc;
use std::time::Duration;

use cover_core::mocks::{ManualClock, RecordingTransport};
use cover_core::runner::drive;
use cover_core::{AxisCfg, AxisCommands, Cover, CoverCfg, Direction, TimerQueue, TravelEstimator};
use cover_traits::{AxisKind, Clock};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn axis(opening: f64, closing: f64) -> AxisCfg {
    AxisCfg {
        commands: AxisCommands {
            open: Some(vec![0x26, 0x00]),
            close: Some(vec![0x26, 0x01]),
            stop: Some(vec![0x26, 0x02]),
        },
        opening_time_s: opening,
        closing_time_s: closing,
    }
}

fn configure(g: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    // Quick tweaking without CLI flags:
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p cover_core --bench estimator
    match std::env::var("BENCH_SAMPLE_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
    {
        Some(n) => {
            g.sample_size(n.max(10));
        }
        None => {
            g.sample_size(50);
        }
    }
    if let Some(ms) = std::env::var("BENCH_MEAS_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        g.measurement_time(Duration::from_millis(ms));
    }
}

pub fn bench_tick(c: &mut Criterion) {
    let mut g = c.benchmark_group("estimator");
    configure(&mut g);

    let clock = ManualClock::new();
    let queue = Arc::new(TimerQueue::new());
    let mut est = TravelEstimator::new(AxisKind::Main, "bench", &axis(300.0, 300.0), queue);
    est.restore("closed", Some(0));
    let t0 = clock.now();
    est.begin_traverse(Direction::Opening, 100, t0);

    g.bench_function("tick", |b| {
        let mut ms = 0u64;
        b.iter(|| {
            ms = (ms + 37) % 300_000;
            est.tick(black_box(t0 + Duration::from_millis(ms)));
            black_box(est.position());
        })
    });

    g.bench_function("full_traverse_300s", |b| {
        b.iter_batched(
            || {
                let clock = ManualClock::new();
                let queue = Arc::new(TimerQueue::new());
                let cover = Cover::builder()
                    .with_transport(RecordingTransport::new())
                    .with_config(CoverCfg {
                        name: "bench".into(),
                        main: axis(300.0, 300.0),
                        ..CoverCfg::default()
                    })
                    .with_scheduler(queue.clone())
                    .with_clock(Arc::new(clock.clone()))
                    .build()
                    .expect("valid cover");
                (cover, queue, clock)
            },
            |(mut cover, queue, clock)| {
                cover.open();
                let delivered = drive(&mut cover, &queue, &clock, None);
                black_box(delivered);
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(estimator, bench_tick);
criterion_main!(estimator);
