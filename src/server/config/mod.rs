//! Load and validate server configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod ffmpeg;
pub mod server;
pub mod sources;
pub mod telemetry;

pub use ffmpeg::{
    parse_ffmpeg_section, FfmpegConfig, RawFfmpegConfig, DEFAULT_COMMAND_TIMEOUT_SECS,
    DEFAULT_FFMPEG_PATH, DEFAULT_FFPROBE_PATH,
};
pub use server::{parse_server_section, RawServerSection, ServerSection, DEFAULT_HOST, DEFAULT_PORT};
pub use sources::{parse_sources_section, RawSourcesConfig, SourcesConfig, DEFAULT_SOURCE_DIR};

pub const CONFIG_ENV_KEY: &str = "MCP_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level configuration container.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub ffmpeg: FfmpegConfig,
    pub sources: SourcesConfig,
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    server: Option<RawServerSection>,
    ffmpeg: Option<RawFfmpegConfig>,
    sources: Option<RawSourcesConfig>,
}

impl ServerConfig {
    /// Load `path` when given; otherwise fall back to built-in defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                telemetry::log_defaults_used(&path);
                let config = Self::defaults(path);
                telemetry::log_loaded(&config);
                Ok(config)
            }
        }
    }

    /// Built-in configuration used when no config file exists.
    pub fn defaults(source_path: PathBuf) -> Self {
        Self {
            server: ServerSection::default(),
            ffmpeg: FfmpegConfig::default(),
            sources: SourcesConfig::install_default(),
            source_path,
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "ffmpeg_mcp::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(config::File::from(path.clone()));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "ffmpeg_mcp::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "ffmpeg_mcp::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "ffmpeg_mcp::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawServerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server, &path)?;
        let ffmpeg = parse_ffmpeg_section(raw.ffmpeg, &path)?;
        let sources = parse_sources_section(raw.sources, &path)?;

        Ok(Self {
            server,
            ffmpeg,
            sources,
            source_path: path,
        })
    }
}
