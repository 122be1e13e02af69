//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "cover", version, about = "Time-based IR/RF cover controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/cover_config.toml")]
    pub config: PathBuf,

    /// Print state and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// JSON file holding the last known state of every cover
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured covers with capabilities and restored state
    List,
    /// Run a script of commands against one cover
    Run {
        /// Cover name as written in the config
        #[arg(long)]
        cover: String,
        /// Simulate the passage of time instead of waiting for real travel
        #[arg(long, action = ArgAction::SetTrue)]
        fast: bool,
        /// Steps: open, close, stop, tilt-open, tilt-close, tilt-stop,
        /// position=N, tilt=N, wait=SECS
        #[arg(required = true, value_name = "STEP")]
        steps: Vec<Step>,
    },
    /// Validate the config and report problems per cover
    SelfCheck,
}

/// One scripted action of `cover run`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Open,
    Close,
    Stop,
    TiltOpen,
    TiltClose,
    TiltStop,
    Position(f64),
    Tilt(f64),
    Wait(f64),
}

fn number(key: &str, value: &str) -> Result<f64, String> {
    let n: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{key} expects a number, got {value:?}"))?;
    if !n.is_finite() || n < 0.0 {
        return Err(format!("{key} must be a non-negative number, got {value:?}"));
    }
    Ok(n)
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some((key, value)) = s.split_once('=') {
            return match key {
                "position" => number(key, value).map(Step::Position),
                "tilt" => number(key, value).map(Step::Tilt),
                "wait" => number(key, value).map(Step::Wait),
                _ => Err(format!("unknown step {s:?}")),
            };
        }
        match s.as_str() {
            "open" => Ok(Step::Open),
            "close" => Ok(Step::Close),
            "stop" => Ok(Step::Stop),
            "tilt-open" => Ok(Step::TiltOpen),
            "tilt-close" => Ok(Step::TiltClose),
            "tilt-stop" => Ok(Step::TiltStop),
            _ => Err(format!("unknown step {s:?}")),
        }
    }
}
