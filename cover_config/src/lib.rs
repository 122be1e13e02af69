#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and packet decoding for IR/RF covers.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Command packets are kept as the base64 text the user wrote and decoded
//!   during validation, so one bad packet rejects only the cover it belongs to.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Longest accepted full-traverse time, in seconds.
pub const TRAVEL_TIME_MAX: f64 = 300.0;

#[derive(Debug, Deserialize)]
pub struct Device {
    /// MAC address of the IR/RF blaster; also the prefix of every cover id.
    pub mac: String,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Awning,
    Blind,
    Curtain,
    Damper,
    Door,
    Garage,
    Gate,
    Shade,
    Shutter,
    Window,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Awning => "awning",
            Self::Blind => "blind",
            Self::Curtain => "curtain",
            Self::Damper => "damper",
            Self::Door => "door",
            Self::Garage => "garage",
            Self::Gate => "gate",
            Self::Shade => "shade",
            Self::Shutter => "shutter",
            Self::Window => "window",
        }
    }
}

/// One user-defined cover. Every command is optional; a missing command
/// simply removes that capability.
#[derive(Debug, Deserialize, Clone)]
pub struct CoverCfg {
    pub name: String,
    #[serde(default)]
    pub device_class: Option<DeviceClass>,

    #[serde(default)]
    pub command_open: Option<String>,
    #[serde(default)]
    pub command_close: Option<String>,
    #[serde(default)]
    pub command_stop: Option<String>,
    /// Seconds for a full 0 -> 100 traverse; 0 means uncalibrated.
    #[serde(default)]
    pub opening_time: f64,
    /// Seconds for a full 100 -> 0 traverse; 0 means uncalibrated.
    #[serde(default)]
    pub closing_time: f64,

    #[serde(default)]
    pub tilt_command_open: Option<String>,
    #[serde(default)]
    pub tilt_command_close: Option<String>,
    #[serde(default)]
    pub tilt_command_stop: Option<String>,
    #[serde(default)]
    pub tilt_opening_time: f64,
    #[serde(default)]
    pub tilt_closing_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub device: Device,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub covers: Vec<CoverCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Decode a base64 IR/RF packet. Missing `=` padding is tolerated since
/// learned codes are often pasted without it.
pub fn decode_packet(text: &str) -> eyre::Result<Vec<u8>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        eyre::bail!("packet is empty");
    }
    let mut padded = trimmed.to_string();
    let extra = padded.len() % 4;
    if extra > 0 {
        padded.extend(std::iter::repeat_n('=', 4 - extra));
    }
    let bytes = STANDARD
        .decode(padded.as_bytes())
        .map_err(|e| eyre::eyre!("packet is not valid base64: {e}"))?;
    if bytes.is_empty() {
        eyre::bail!("packet decodes to zero bytes");
    }
    Ok(bytes)
}

/// Parse a MAC address written as `aa:bb:cc:dd:ee:ff`, `aa-bb-...` or `aabbccddeeff`.
pub fn parse_mac(text: &str) -> eyre::Result<[u8; 6]> {
    let hex: String = text
        .trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();
    if hex.len() != 12 || !hex.is_ascii() {
        eyre::bail!("device.mac must contain exactly 6 hex bytes, got {text:?}");
    }
    let mut out = [0u8; 6];
    for (i, byte) in out.iter_mut().enumerate() {
        let pair = &hex[i * 2..i * 2 + 2];
        *byte = u8::from_str_radix(pair, 16)
            .map_err(|_| eyre::eyre!("device.mac has invalid hex byte {pair:?}"))?;
    }
    Ok(out)
}

fn validate_travel_time(field: &str, seconds: f64) -> eyre::Result<()> {
    if !seconds.is_finite() {
        eyre::bail!("{field} must be a finite number of seconds");
    }
    if !(0.0..=TRAVEL_TIME_MAX).contains(&seconds) {
        eyre::bail!("{field} must be in [0, {TRAVEL_TIME_MAX}] seconds, got {seconds}");
    }
    Ok(())
}

fn validate_packet(field: &str, packet: Option<&String>) -> eyre::Result<()> {
    if let Some(text) = packet {
        decode_packet(text).map_err(|e| eyre::eyre!("{field}: {e}"))?;
    }
    Ok(())
}

impl CoverCfg {
    /// Validate a single cover in isolation.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.name.trim().is_empty() {
            eyre::bail!("cover name must not be empty");
        }

        validate_travel_time("opening_time", self.opening_time)?;
        validate_travel_time("closing_time", self.closing_time)?;
        validate_travel_time("tilt_opening_time", self.tilt_opening_time)?;
        validate_travel_time("tilt_closing_time", self.tilt_closing_time)?;

        validate_packet("command_open", self.command_open.as_ref())?;
        validate_packet("command_close", self.command_close.as_ref())?;
        validate_packet("command_stop", self.command_stop.as_ref())?;
        validate_packet("tilt_command_open", self.tilt_command_open.as_ref())?;
        validate_packet("tilt_command_close", self.tilt_command_close.as_ref())?;
        validate_packet("tilt_command_stop", self.tilt_command_stop.as_ref())?;

        Ok(())
    }
}

/// Outcome of per-cover validation: valid covers are kept, invalid ones are
/// reported by name and dropped without affecting the rest.
#[derive(Debug, Default)]
pub struct CoverReport<'a> {
    pub accepted: Vec<&'a CoverCfg>,
    pub rejected: Vec<(String, eyre::Report)>,
}

impl Config {
    /// Validate device-wide settings. Covers are checked by `validate_covers`.
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        parse_mac(&self.device.mac)?;
        if let Some(host) = &self.device.host
            && host.trim().is_empty()
        {
            eyre::bail!("device.host must not be empty when set");
        }

        // Logging
        if let Some(level) = &self.logging.level
            && !matches!(
                level.to_ascii_lowercase().as_str(),
                "error" | "warn" | "info" | "debug" | "trace"
            )
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace, got {level:?}");
        }
        if let Some(rotation) = &self.logging.rotation
            && !matches!(
                rotation.to_ascii_lowercase().as_str(),
                "never" | "daily" | "hourly"
            )
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rotation:?}");
        }

        Ok(())
    }

    /// Validate every cover; a duplicate name rejects the later occurrence.
    pub fn validate_covers(&self) -> CoverReport<'_> {
        let mut report = CoverReport::default();
        let mut seen = std::collections::HashSet::new();
        for cover in &self.covers {
            if let Err(e) = cover.validate() {
                report.rejected.push((cover.name.clone(), e));
                continue;
            }
            if !seen.insert(cover.name.trim().to_string()) {
                report.rejected.push((
                    cover.name.clone(),
                    eyre::eyre!("duplicate cover name {:?}", cover.name),
                ));
                continue;
            }
            report.accepted.push(cover);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_padding_is_restored() {
        // "aGk" is "hi" without its trailing '='.
        assert_eq!(decode_packet("aGk").unwrap(), b"hi".to_vec());
        assert_eq!(decode_packet("aGk=").unwrap(), b"hi".to_vec());
    }

    #[test]
    fn blank_packet_is_rejected() {
        assert!(decode_packet("   ").is_err());
    }

    #[test]
    fn mac_accepts_common_separators() {
        let want = [0x34, 0xea, 0x34, 0xb4, 0x3c, 0x8a];
        assert_eq!(parse_mac("34:ea:34:b4:3c:8a").unwrap(), want);
        assert_eq!(parse_mac("34-EA-34-B4-3C-8A").unwrap(), want);
        assert_eq!(parse_mac("34ea34b43c8a").unwrap(), want);
    }

    #[test]
    fn mac_rejects_wrong_length() {
        assert!(parse_mac("34:ea:34").is_err());
        assert!(parse_mac("zz:ea:34:b4:3c:8a").is_err());
    }
}
