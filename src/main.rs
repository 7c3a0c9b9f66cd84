#![forbid(unsafe_code)]

mod app;
mod clipboard;
mod config;
mod diag;
mod error;
mod fs_ops;
mod keymap;
mod model;
mod pane;
mod term;
mod ui;
mod vfs;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

use crate::app::{Session, Settings};
use crate::config::{Cli, Config, LOG_ENV, default_config_path, load_file_config};
use crate::term::{TerminalConsole, default_panel_width};
use crate::ui::MIN_PANEL_WIDTH;
use crate::vfs::LocalFs;

fn main() -> Result<()> {
    // Must run before any thread exists, or the local offset is unavailable.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let file_config = load_file_config(&config_path)?;
    let cwd = std::env::current_dir().context("reading current directory")?;
    let config = Config::resolve(cli, file_config, &cwd, std::env::var(LOG_ENV).ok());
    init_logging(&config)?;
    tracing::info!(left = %config.left.display(), right = %config.right.display(), "starting");

    let settings = Settings {
        panel_width: config
            .panel_width
            .unwrap_or_else(default_panel_width)
            .max(MIN_PANEL_WIDTH),
        sort_mode: config.sort_mode,
        collision: config.collision,
        offset,
    };
    let mut session = Session::new(LocalFs, config.left, config.right, settings);
    let mut console = TerminalConsole::enter().context("setting up terminal")?;
    session.run(&mut console).context("terminal I/O failed")?;
    Ok(())
}

/// The screen owns stdout, so logs only go to a file, and only when asked.
fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
