#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::model::{CollisionPolicy, SortMode};

/// Env var that both enables file logging and carries the filter.
pub const LOG_ENV: &str = "TWINPANEL_LOG";

#[derive(Debug, Parser)]
#[command(name = "twinpanel", version, about = "Dual-pane terminal file browser")]
pub struct Cli {
    /// Starting directory of the left panel [default: current dir]
    pub left: Option<PathBuf>,

    /// Starting directory of the right panel [default: current dir]
    pub right: Option<PathBuf>,

    /// Column width of each panel
    #[arg(long)]
    pub width: Option<usize>,

    /// Entry order inside a panel
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Replace existing targets on paste instead of failing the item
    #[arg(long)]
    pub overwrite: bool,

    /// Config file [default: ~/.twinpanel/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub left: Option<PathBuf>,
    pub right: Option<PathBuf>,
    pub panel_width: Option<usize>,
    pub sort: Option<SortMode>,
    pub paste_collision: Option<CollisionPolicy>,
    pub log_file: Option<PathBuf>,
    pub log_filter: Option<String>,
}

/// Settings after merging the CLI over the file over the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub left: PathBuf,
    pub right: PathBuf,
    /// `None` means derive from the terminal width.
    pub panel_width: Option<usize>,
    pub sort_mode: SortMode,
    pub collision: CollisionPolicy,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn default_config_path() -> PathBuf {
    home_dir().join(".twinpanel").join("config.toml")
}

/// A missing file is the default config; a malformed one is an error.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

impl Config {
    /// `log_env` is the value of `TWINPANEL_LOG`, if set.
    pub fn resolve(cli: Cli, file: FileConfig, cwd: &Path, log_env: Option<String>) -> Self {
        let absolute = |p: PathBuf| if p.is_absolute() { p } else { cwd.join(p) };
        let left = cli.left.or(file.left).map(absolute).unwrap_or_else(|| cwd.to_path_buf());
        let right = cli
            .right
            .or(file.right)
            .map(absolute)
            .unwrap_or_else(|| cwd.to_path_buf());
        let collision = if cli.overwrite {
            CollisionPolicy::Overwrite
        } else {
            file.paste_collision.unwrap_or_default()
        };
        let log_file = cli
            .log_file
            .or(file.log_file)
            .or_else(|| log_env.is_some().then(|| std::env::temp_dir().join("twinpanel.log")));
        let log_filter = log_env
            .filter(|f| !f.is_empty())
            .or(file.log_filter)
            .unwrap_or_else(|| "info".to_string());

        Self {
            left,
            right,
            panel_width: cli.width.or(file.panel_width),
            sort_mode: cli.sort.or(file.sort).unwrap_or_default(),
            collision,
            log_file,
            log_filter,
        }
    }
}
