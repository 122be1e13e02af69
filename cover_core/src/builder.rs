//! Type-state builder for `Cover`.
//!
//! The builder enforces at compile time that a transport and a cover config are
//! provided before `build()` is available. `try_build()` is always available for
//! dynamic checks; the scheduler is checked there too.

use std::marker::PhantomData;
use std::sync::Arc;

use cover_config::TRAVEL_TIME_MAX;
use cover_traits::{AxisKind, Clock, MonotonicClock, Scheduler, Transport};

use crate::axis::AxisController;
use crate::config::{AxisCfg, CoverCfg};
use crate::cover::{Cover, OnChange};
use crate::error::{BuildError, Result};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Cover`. All fields are validated on `build()`.
pub struct CoverBuilder<T, C> {
    transport: Option<Box<dyn Transport>>,
    cfg: Option<CoverCfg>,
    scheduler: Option<Arc<dyn Scheduler + Send + Sync>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    device_id: Option<String>,
    on_change: Option<OnChange>,
    _t: PhantomData<T>,
    _c: PhantomData<C>,
}

impl Default for CoverBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            transport: None,
            cfg: None,
            scheduler: None,
            clock: None,
            device_id: None,
            on_change: None,
            _t: PhantomData,
            _c: PhantomData,
        }
    }
}

impl Cover {
    /// Start building a Cover.
    pub fn builder() -> CoverBuilder<Missing, Missing> {
        CoverBuilder::default()
    }
}

fn invalid(msg: String) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate_axis(prefix: &str, axis: &AxisCfg) -> Result<()> {
    for (field, value) in [
        ("opening_time", axis.opening_time_s),
        ("closing_time", axis.closing_time_s),
    ] {
        if !value.is_finite() || !(0.0..=TRAVEL_TIME_MAX).contains(&value) {
            return Err(invalid(format!(
                "{prefix}{field} must be in [0, {TRAVEL_TIME_MAX}] seconds"
            )));
        }
    }
    for (field, packet) in [
        ("command_open", &axis.commands.open),
        ("command_close", &axis.commands.close),
        ("command_stop", &axis.commands.stop),
    ] {
        if packet.as_ref().is_some_and(Vec::is_empty) {
            return Err(invalid(format!("{prefix}{field} must not be empty")));
        }
    }
    Ok(())
}

impl<T, C> CoverBuilder<T, C> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Cover> {
        let transport = self
            .transport
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTransport))?;
        let cfg = self
            .cfg
            .ok_or_else(|| eyre::Report::new(BuildError::MissingConfig))?;
        let scheduler = self
            .scheduler
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScheduler))?;

        let name = cfg.name.trim();
        if name.is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        validate_axis("", &cfg.main)?;
        validate_axis("tilt_", &cfg.tilt)?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let id = match self.device_id.as_deref() {
            Some(device) if !device.is_empty() => format!("{device}-{name}"),
            _ => name.to_string(),
        };

        let main = AxisController::new(
            AxisKind::Main,
            name,
            &cfg.main,
            scheduler.clone(),
            clock.clone(),
        );
        let tilt = AxisController::new(
            AxisKind::Tilt,
            format!("{name} (tilt)"),
            &cfg.tilt,
            scheduler,
            clock,
        );
        tracing::debug!(cover = %id, main = ?main.capabilities(), tilt = ?tilt.capabilities(), "cover built");

        Ok(Cover {
            id,
            name: name.to_string(),
            device_class: cfg.device_class,
            transport,
            main,
            tilt,
            on_change: self.on_change,
        })
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler + Send + Sync>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Identifier of the blaster the cover hangs off; prefixes the unique id.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_change = Some(Box::new(f));
        self
    }
}

// Setters that advance type-state
impl<C> CoverBuilder<Missing, C> {
    pub fn with_transport(self, transport: impl Transport + 'static) -> CoverBuilder<Set, C> {
        CoverBuilder {
            transport: Some(Box::new(transport)),
            cfg: self.cfg,
            scheduler: self.scheduler,
            clock: self.clock,
            device_id: self.device_id,
            on_change: self.on_change,
            _t: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<T> CoverBuilder<T, Missing> {
    pub fn with_config(self, cfg: CoverCfg) -> CoverBuilder<T, Set> {
        CoverBuilder {
            transport: self.transport,
            cfg: Some(cfg),
            scheduler: self.scheduler,
            clock: self.clock,
            device_id: self.device_id,
            on_change: self.on_change,
            _t: PhantomData,
            _c: PhantomData,
        }
    }
}

impl CoverBuilder<Set, Set> {
    /// Validate and build the Cover. Only available when transport and config are set.
    pub fn build(self) -> Result<Cover> {
        self.try_build()
    }
}
