use tracing::{debug, info};

use super::{ServerConfig, CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};

pub fn log_defaults_used(path: &std::path::Path) {
    debug!(
        target: "ffmpeg_mcp::config",
        path = %path.display(),
        env = CONFIG_ENV_KEY,
        default = DEFAULT_CONFIG_PATH,
        "No configuration file found; using built-in defaults"
    );
}

pub fn log_loaded(config: &ServerConfig) {
    info!(
        target: "ffmpeg_mcp::config",
        path = %config.source_path.display(),
        host = %config.server.host,
        port = config.server.port,
        ffmpeg_path = %config.ffmpeg.ffmpeg_path.display(),
        ffprobe_path = %config.ffmpeg.ffprobe_path.display(),
        command_timeout_secs = config.ffmpeg.command_timeout_secs,
        source_root = %config.sources.root.display(),
        "Configuration loaded"
    );
}
