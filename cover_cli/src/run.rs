//! Command implementations: assemble covers from config, drive them, persist state.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use cover_config::{Config, parse_mac};
use cover_core::mocks::ManualClock;
use cover_core::runner::drive_with;
use cover_core::{Cover, CoverCfg, CoverState, TimerQueue};
use cover_hardware::SimulatedTransport;
use cover_traits::{Clock, MonotonicClock, RestoreSource};
use eyre::WrapErr;
use thiserror::Error;

use crate::cli::Step;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("no cover named {0:?} in the config")]
    UnknownCover(String),
    #[error("cover {name:?} is invalid: {reason}")]
    RejectedCover { name: String, reason: String },
    #[error("{0} cover(s) failed validation")]
    InvalidCovers(usize),
}

/// A built cover together with the timer queue that drives it.
pub struct Slot {
    pub cover: Cover,
    pub queue: Arc<TimerQueue>,
}

/// Canonical `aa:bb:cc:dd:ee:ff` form of the device MAC; prefixes every cover id.
pub fn device_id(cfg: &Config) -> eyre::Result<String> {
    let mac = parse_mac(&cfg.device.mac)?;
    Ok(mac
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":"))
}

fn build_one(
    raw: &cover_config::CoverCfg,
    device: &str,
    transport: &SimulatedTransport,
    clock: &Arc<dyn Clock + Send + Sync>,
    on_change: Option<Box<dyn Fn()>>,
) -> eyre::Result<Slot> {
    let cfg = CoverCfg::try_from(raw)?;
    let queue = Arc::new(TimerQueue::new());
    let mut builder = Cover::builder()
        .with_transport(transport.clone())
        .with_config(cfg)
        .with_scheduler(queue.clone())
        .with_clock(clock.clone())
        .with_device_id(device);
    if let Some(f) = on_change {
        builder = builder.on_change(f);
    }
    let cover = builder.build()?;
    Ok(Slot { cover, queue })
}

/// Build every valid cover, restoring each from `restore`. Invalid covers are
/// logged and skipped; the rest keep working.
pub fn build_covers(
    cfg: &Config,
    transport: &SimulatedTransport,
    clock: &Arc<dyn Clock + Send + Sync>,
    restore: &dyn RestoreSource,
) -> eyre::Result<Vec<Slot>> {
    let device = device_id(cfg)?;
    let report = cfg.validate_covers();
    for (name, err) in &report.rejected {
        tracing::warn!(cover = %name, error = %err, "skipping invalid cover");
    }
    let mut slots = Vec::with_capacity(report.accepted.len());
    for raw in report.accepted {
        match build_one(raw, &device, transport, clock, None) {
            Ok(mut slot) => {
                slot.cover.restore_from(restore);
                slots.push(slot);
            }
            Err(e) => tracing::warn!(cover = %raw.name, error = %e, "skipping invalid cover"),
        }
    }
    Ok(slots)
}

fn pos(p: Option<u8>) -> String {
    p.map_or_else(|| "-".to_string(), |p| p.to_string())
}

fn print_state(state: &CoverState, json: bool) {
    if json {
        match serde_json::to_string(state) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize state"),
        }
    } else {
        println!(
            "{}: {} position={} tilt={} tilt_position={}{}",
            state.name,
            state.state,
            pos(state.position),
            state.tilt_state,
            pos(state.tilt_position),
            if state.available { "" } else { " (unavailable)" }
        );
    }
}

fn caps_text(state: &CoverState) -> String {
    let c = &state.capabilities;
    let flags = [
        (c.open, "open"),
        (c.close, "close"),
        (c.stop, "stop"),
        (c.set_position, "position"),
        (c.open_tilt, "tilt-open"),
        (c.close_tilt, "tilt-close"),
        (c.stop_tilt, "tilt-stop"),
        (c.set_tilt_position, "tilt-position"),
    ];
    let on: Vec<&str> = flags.iter().filter(|(f, _)| *f).map(|(_, n)| *n).collect();
    if on.is_empty() {
        "none".to_string()
    } else {
        on.join(",")
    }
}

pub fn list(cfg: &Config, restore: &dyn RestoreSource, json: bool) -> eyre::Result<()> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
    let transport = SimulatedTransport::new();
    let slots = build_covers(cfg, &transport, &clock, restore)?;
    for slot in &slots {
        let state = slot.cover.snapshot();
        if json {
            print_state(&state, true);
        } else {
            println!(
                "{} [{}] class={} supports={} state={} position={}",
                state.name,
                state.id,
                slot.cover.device_class().map_or("-", |c| c.as_str()),
                caps_text(&state),
                state.state,
                pos(state.position),
            );
        }
    }
    Ok(())
}

fn apply(cover: &mut Cover, step: Step) {
    tracing::info!(cover = %cover.name(), ?step, "step");
    match step {
        Step::Open => cover.open(),
        Step::Close => cover.close(),
        Step::Stop => cover.stop(),
        Step::TiltOpen => cover.open_tilt(),
        Step::TiltClose => cover.close_tilt(),
        Step::TiltStop => cover.stop_tilt(),
        Step::Position(p) => cover.set_position(p),
        Step::Tilt(p) => cover.set_tilt_position(p),
        Step::Wait(_) => {}
    }
}

/// Run `steps` against the cover called `name`, then let any travel finish.
/// Returns the cover so the caller can persist its final state.
pub fn run(
    cfg: &Config,
    restore: &dyn RestoreSource,
    name: &str,
    fast: bool,
    steps: &[Step],
    json: bool,
) -> eyre::Result<Cover> {
    let raw = cfg
        .covers
        .iter()
        .find(|c| c.name.trim() == name.trim())
        .ok_or_else(|| RunError::UnknownCover(name.to_string()))?;
    if let Err(e) = raw.validate() {
        return Err(RunError::RejectedCover {
            name: name.to_string(),
            reason: format!("{e:#}"),
        }
        .into());
    }

    let clock: Arc<dyn Clock + Send + Sync> = if fast {
        Arc::new(ManualClock::new())
    } else {
        Arc::new(MonotonicClock::new())
    };
    let transport = SimulatedTransport::new();
    let device = device_id(cfg)?;

    let dirty = Rc::new(Cell::new(false));
    let flag = dirty.clone();
    let observer: Box<dyn Fn()> = Box::new(move || flag.set(true));
    let Slot { mut cover, queue } = build_one(raw, &device, &transport, &clock, Some(observer))
        .wrap_err_with(|| format!("building cover {name:?}"))?;
    cover.restore_from(restore);

    let mut flush = |c: &Cover| {
        if dirty.replace(false) {
            print_state(&c.snapshot(), json);
        }
    };

    print_state(&cover.snapshot(), json);
    for &step in steps {
        if let Step::Wait(secs) = step {
            let until = clock.now() + Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
            drive_with(&mut cover, &queue, &*clock, Some(until), &mut flush);
        } else {
            apply(&mut cover, step);
            flush(&cover);
        }
    }
    drive_with(&mut cover, &queue, &*clock, None, &mut flush);

    tracing::info!(
        cover = %cover.unique_id(),
        packets = transport.sent().len(),
        "run complete"
    );
    Ok(cover)
}

/// Validate the config; every cover is checked and reported.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let report = cfg.validate_covers();
    for cover in &report.accepted {
        if json {
            println!("{}", serde_json::json!({ "cover": cover.name, "ok": true }));
        } else {
            println!("ok: {}", cover.name);
        }
    }
    for (name, err) in &report.rejected {
        if json {
            println!(
                "{}",
                serde_json::json!({ "cover": name, "ok": false, "error": format!("{err:#}") })
            );
        } else {
            println!("invalid: {name}: {err:#}");
        }
    }
    if !report.rejected.is_empty() {
        return Err(RunError::InvalidCovers(report.rejected.len()).into());
    }
    if !json {
        println!("self-check ok");
    }
    Ok(())
}
