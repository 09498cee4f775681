use std::{path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;
const MAX_COMMAND_TIMEOUT_SECS: u64 = 86_400;

/// ffmpeg/ffprobe binaries and subprocess limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub command_timeout_secs: u64,
}

impl FfmpegConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
            ffprobe_path: PathBuf::from(DEFAULT_FFPROBE_PATH),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawFfmpegConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub command_timeout_secs: Option<u64>,
}

pub fn parse_ffmpeg_section(
    raw: Option<RawFfmpegConfig>,
    path: &Path,
) -> Result<FfmpegConfig, ConfigError> {
    let ffmpeg_raw = raw.unwrap_or_default();

    let ffmpeg_path = ffmpeg_raw
        .ffmpeg_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FFMPEG_PATH));
    validate_binary_path(path, "ffmpeg.ffmpeg_path", &ffmpeg_path)?;

    let ffprobe_path = ffmpeg_raw
        .ffprobe_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FFPROBE_PATH));
    validate_binary_path(path, "ffmpeg.ffprobe_path", &ffprobe_path)?;

    let command_timeout_secs = ffmpeg_raw
        .command_timeout_secs
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS);
    if !(1..=MAX_COMMAND_TIMEOUT_SECS).contains(&command_timeout_secs) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "ffmpeg.command_timeout_secs",
            message: format!("Specify a value between 1 and {MAX_COMMAND_TIMEOUT_SECS} seconds"),
        });
    }

    Ok(FfmpegConfig {
        ffmpeg_path,
        ffprobe_path,
        command_timeout_secs,
    })
}

fn validate_binary_path(
    path: &Path,
    field: &'static str,
    binary: &Path,
) -> Result<(), ConfigError> {
    if binary.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Provide an executable name on PATH or an absolute path".into(),
        });
    }
    Ok(())
}
