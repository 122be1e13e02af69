//! Configuration types for the cover engine.
//!
//! These are the runtime configuration structs used by `Cover`, with packets
//! already decoded. They are separate from the TOML-deserialized config in
//! `cover_config`.

use cover_config::DeviceClass;

/// Raw IR/RF packets for one axis. Absent packets remove the matching capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisCommands {
    pub open: Option<Vec<u8>>,
    pub close: Option<Vec<u8>>,
    pub stop: Option<Vec<u8>>,
}

/// Configuration of one axis (main or tilt).
#[derive(Debug, Clone, Default)]
pub struct AxisCfg {
    pub commands: AxisCommands,
    /// Seconds for a full 0 -> 100 traverse; 0 means uncalibrated.
    pub opening_time_s: f64,
    /// Seconds for a full 100 -> 0 traverse; 0 means uncalibrated.
    pub closing_time_s: f64,
}

impl AxisCfg {
    /// Travel-time calibration for both directions.
    pub fn is_calibrated(&self) -> bool {
        self.opening_time_s > 0.0 && self.closing_time_s > 0.0
    }
}

/// Operations an axis supports, derived once from its configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub open: bool,
    pub close: bool,
    pub stop: bool,
    /// Requires all three packets and both travel times > 0.
    pub set_position: bool,
}

impl Capabilities {
    pub fn from_axis(cfg: &AxisCfg) -> Self {
        let open = cfg.commands.open.is_some();
        let close = cfg.commands.close.is_some();
        let stop = cfg.commands.stop.is_some();
        Self {
            open,
            close,
            stop,
            set_position: open && close && stop && cfg.is_calibrated(),
        }
    }

    /// An axis with no capability at all is disabled.
    pub fn any(&self) -> bool {
        self.open || self.close || self.stop || self.set_position
    }
}

/// Runtime configuration of a whole cover.
#[derive(Debug, Clone, Default)]
pub struct CoverCfg {
    pub name: String,
    pub device_class: Option<DeviceClass>,
    pub main: AxisCfg,
    pub tilt: AxisCfg,
}
