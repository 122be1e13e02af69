//! Conversions bridging `cover_config` types to `cover_core` types.
//!
//! Packets are decoded here, so a cover that reaches the builder only carries bytes.

use cover_config::decode_packet;
use eyre::WrapErr;

use crate::config::{AxisCfg, AxisCommands, CoverCfg};

fn packet(field: &str, text: Option<&String>) -> eyre::Result<Option<Vec<u8>>> {
    text.map(|t| decode_packet(t).wrap_err_with(|| format!("decoding {field}")))
        .transpose()
}

impl TryFrom<&cover_config::CoverCfg> for CoverCfg {
    type Error = eyre::Report;

    fn try_from(c: &cover_config::CoverCfg) -> Result<Self, Self::Error> {
        Ok(Self {
            name: c.name.trim().to_string(),
            device_class: c.device_class,
            main: AxisCfg {
                commands: AxisCommands {
                    open: packet("command_open", c.command_open.as_ref())?,
                    close: packet("command_close", c.command_close.as_ref())?,
                    stop: packet("command_stop", c.command_stop.as_ref())?,
                },
                opening_time_s: c.opening_time,
                closing_time_s: c.closing_time,
            },
            tilt: AxisCfg {
                commands: AxisCommands {
                    open: packet("tilt_command_open", c.tilt_command_open.as_ref())?,
                    close: packet("tilt_command_close", c.tilt_command_close.as_ref())?,
                    stop: packet("tilt_command_stop", c.tilt_command_stop.as_ref())?,
                },
                opening_time_s: c.tilt_opening_time,
                closing_time_s: c.tilt_closing_time,
            },
        })
    }
}
