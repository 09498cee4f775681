//! CLI entrypoint module structure.
use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::{lib::process::ProcessRunner, server::config::ServerConfig};

pub mod args;
pub mod profile;

pub use args::{CliCommand, LaunchProfileArgs, ParsedCommand};
pub use profile::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};

/// Execute CLI command mode and return a user-facing result payload.
pub async fn execute_cli_command(command: CliCommand, config: &ServerConfig) -> Result<String> {
    match command {
        CliCommand::Doctor => {
            let report = run_doctor(config).await;
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Installation check printed by `doctor`.
#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub ok: bool,
    pub config_path: String,
    pub ffmpeg: BinaryCheck,
    pub ffprobe: BinaryCheck,
    pub source_root: SourceRootCheck,
}

#[derive(Debug, Serialize)]
pub struct BinaryCheck {
    pub path: String,
    pub available: bool,
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SourceRootCheck {
    pub path: String,
    pub is_dir: bool,
}

pub async fn run_doctor(config: &ServerConfig) -> DoctorReport {
    let runner = ProcessRunner::new(Some(config.ffmpeg.command_timeout()));
    let ffmpeg = check_binary(&runner, &config.ffmpeg.ffmpeg_path, "ffmpeg").await;
    let ffprobe = check_binary(&runner, &config.ffmpeg.ffprobe_path, "ffprobe").await;
    let source_root = SourceRootCheck {
        path: config.sources.root.display().to_string(),
        is_dir: config.sources.root.is_dir(),
    };

    let ok = ffmpeg.available && ffprobe.available && source_root.is_dir;
    info!(
        target: "ffmpeg_mcp::runtime",
        ok,
        ffmpeg_version = ffmpeg.version.as_deref().unwrap_or(""),
        source_root = %source_root.path,
        "Doctor checks finished"
    );
    DoctorReport {
        ok,
        config_path: config.source_path.display().to_string(),
        ffmpeg,
        ffprobe,
        source_root,
    }
}

async fn check_binary(runner: &ProcessRunner, path: &Path, name: &str) -> BinaryCheck {
    let display = path.display().to_string();
    match runner.run(path, &["-version"]).await {
        Ok(result) if result.success() => BinaryCheck {
            path: display,
            available: true,
            version: parse_version(name, &result.stdout_lossy()),
            detail: None,
        },
        Ok(result) => BinaryCheck {
            path: display,
            available: false,
            version: None,
            detail: Some(format!(
                "exit={}: {}",
                result.exit_code,
                result.stderr_lossy().trim_end()
            )),
        },
        Err(err) => BinaryCheck {
            path: display,
            available: false,
            version: None,
            detail: Some(err.to_string()),
        },
    }
}

/// `<binary> version <numeric>` banner, as printed by `ffmpeg -version` and `ffprobe -version`.
static VERSION_BANNER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(ffmpeg|ffprobe) version (\d+(?:\.\d+)*)").ok());

/// Numeric version from a `<name> version 6.1.1-...` banner line.
pub fn parse_version(name: &str, output: &str) -> Option<String> {
    let pattern = VERSION_BANNER.as_ref()?;
    pattern
        .captures_iter(output)
        .find(|captures| &captures[1] == name)
        .map(|captures| captures[2].to_string())
}
