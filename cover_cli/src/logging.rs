//! Console and optional rolling-file logging.

use std::path::Path;

use cover_config::Logging;
use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::FILE_GUARD;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// Console logs go to stderr so stdout stays machine-readable. `RUST_LOG`
/// overrides `console_level`. When `[logging].file` is set, JSON lines are
/// also written there at `[logging].level` (default info).
pub fn init(json: bool, console_level: &str, cfg: Option<&Logging>) -> eyre::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().with_filter(console_filter).boxed());
    } else {
        layers.push(console.with_filter(console_filter).boxed());
    }

    if let Some(cfg) = cfg {
        if let Some(file) = cfg.file.as_deref() {
            layers.push(file_layer(file, cfg)?);
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("installing log subscriber")
}

fn file_layer(file: &str, cfg: &Logging) -> eyre::Result<BoxedLayer> {
    let path = Path::new(file);
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("creating log directory {}", dir.display()))?;

    let appender = match cfg.rotation.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("daily") => tracing_appender::rolling::daily(dir, name),
        Some("hourly") => tracing_appender::rolling::hourly(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);

    let level = cfg.level.as_deref().unwrap_or("info");
    Ok(fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(EnvFilter::new(level))
        .boxed())
}
