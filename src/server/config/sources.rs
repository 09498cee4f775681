use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::lib::{errors::ConfigError, paths};

/// Directory name of the FFmpeg checkout next to the installed binary.
pub const DEFAULT_SOURCE_DIR: &str = "ffmpeg_src";

/// FFmpeg source tree settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcesConfig {
    pub root: PathBuf,
}

impl SourcesConfig {
    /// `<directory of the running executable>/ffmpeg_src`, falling back to the working directory.
    pub fn install_default() -> Self {
        let base = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| env::current_dir().ok())
            .unwrap_or_default();
        Self {
            root: base.join(DEFAULT_SOURCE_DIR),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawSourcesConfig {
    pub root: Option<PathBuf>,
}

/// Relative roots are resolved against the directory holding the config file.
pub fn parse_sources_section(
    raw: Option<RawSourcesConfig>,
    path: &Path,
) -> Result<SourcesConfig, ConfigError> {
    let Some(root) = raw.unwrap_or_default().root else {
        return Ok(SourcesConfig::install_default());
    };
    if root.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "sources.root",
            message: "Provide the FFmpeg source directory".into(),
        });
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(SourcesConfig {
        root: paths::resolve_against(base, &root),
    })
}
