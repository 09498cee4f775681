//! LaunchProfile and config path resolution.
use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::server::config::{CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};

/// MCP transport mode.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Tcp,
}

impl TransportMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Tcp => "tcp",
        }
    }
}

/// Resolved launch profile.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    /// `None` means no config file was found and built-in defaults apply.
    pub config_path: Option<PathBuf>,
    pub transport: TransportMode,
    pub launch_args: Vec<String>,
}

/// Resolve the config path: CLI override → `MCP_CONFIG_PATH` → `./config.toml` if it exists.
///
/// Explicit paths are returned even when missing so that loading reports the error.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let explicit = override_path.or_else(|| env::var_os(CONFIG_ENV_KEY).map(PathBuf::from));
    let cwd = env::current_dir().context("failed to obtain current directory")?;

    match explicit {
        Some(path) => Ok(Some(absolutize(&cwd, path))),
        None => {
            let default = cwd.join(DEFAULT_CONFIG_PATH);
            Ok(default.is_file().then_some(default))
        }
    }
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Build launch arguments suitable for reproduction/logging.
pub fn build_launch_args(transport: TransportMode, config: Option<&Path>) -> Vec<String> {
    let mut args = vec![format!("--transport={}", transport.as_str())];
    if let Some(config) = config {
        args.push(format!("--config={}", config.display()));
    }
    args
}
