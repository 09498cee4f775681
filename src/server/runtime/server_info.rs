use crate::{cli::LaunchProfile, server::config::ServerConfig, tools::ToolRegistry};

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(
    profile: &LaunchProfile,
    config: &ServerConfig,
    registry: &ToolRegistry,
) -> String {
    let tools = registry
        .list()
        .map(|descriptor| descriptor.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "FFmpeg tools over {transport} (config {path}). Tools: {tools}. Source paths are relative to {root}; `..` is rejected. Commands run without a shell and are killed after {timeout}s.",
        transport = profile.transport.as_str(),
        path = config.source_path.display(),
        root = config.sources.root.display(),
        timeout = config.ffmpeg.command_timeout_secs,
    )
}
