mod cli;
mod error_fmt;
mod logging;
mod run;
mod state_file;

use std::fs;

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::state_file::StateFile;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %format!("{e:#}"), "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let text = fs::read_to_string(&cli.config)
        .wrap_err_with(|| format!("reading config {}", cli.config.display()))?;
    let parsed = cover_config::load_toml(&text);

    logging::init(
        cli.json,
        &cli.log_level,
        parsed.as_ref().ok().map(|c| &c.logging),
    )?;

    let cfg = parsed?;
    cfg.validate().wrap_err("invalid configuration")?;
    tracing::debug!(config = %cli.config.display(), covers = cfg.covers.len(), "config loaded");

    let mut state = match &cli.state {
        Some(path) => StateFile::load(path)?,
        None => StateFile::default(),
    };

    match cli.cmd {
        Commands::List => run::list(&cfg, &state, cli.json),
        Commands::SelfCheck => run::self_check(&cfg, cli.json),
        Commands::Run { cover, fast, steps } => {
            let cover = run::run(&cfg, &state, &cover, fast, &steps, cli.json)?;
            if let Some(path) = &cli.state {
                state.record(&cover);
                state.save(path)?;
                tracing::info!(path = %path.display(), "state saved");
            }
            Ok(())
        }
    }
}
