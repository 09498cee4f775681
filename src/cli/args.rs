//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunServer(LaunchProfile),
    /// Utility command; the profile carries the resolved config path.
    Cli(CliCommand, LaunchProfile),
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum CliCommand {
    /// Check the configured ffmpeg/ffprobe binaries and source tree, then print a JSON report.
    #[command(
        about = "Verify ffmpeg, ffprobe and the FFmpeg source tree",
        after_help = "The report is printed as JSON; the exit status is 0 even when a check fails."
    )]
    Doctor,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "FFmpeg MCP server: run ffmpeg/ffprobe, browse FFmpeg sources, grab frames",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Select stdio (default) or tcp.
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,
    /// Path to config.toml (overrides MCP_CONFIG_PATH).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchProfile> {
        let config_path = resolve_config_path(self.config_override)?;
        let launch_args = build_launch_args(self.transport, config_path.as_deref());

        Ok(LaunchProfile {
            config_path,
            transport: self.transport,
            launch_args,
        })
    }

    /// Parse CLI args into either server launch mode or utility command mode.
    pub fn into_command(mut self) -> Result<ParsedCommand> {
        match self.command.take() {
            Some(command) => Ok(ParsedCommand::Cli(command, self.build()?)),
            None => Ok(ParsedCommand::RunServer(self.build()?)),
        }
    }
}
