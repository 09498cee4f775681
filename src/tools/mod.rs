//! MCP tools: registry, dispatcher, result encoder, and the FFmpeg handlers.

pub mod dispatch;
pub mod encoder;
pub mod ffmpeg;
pub mod registry;

use std::sync::Arc;

use tracing::info;

use crate::server::config::ServerConfig;

pub use dispatch::{ToolCallRequest, ToolDispatcher};
pub use encoder::{ImageFormat, ToolOutput};
pub use ffmpeg::FfmpegToolset;
pub use registry::{ToolDescriptor, ToolRegistry, ToolRegistryBuilder};

/// Build the read-only registry holding every tool this server exposes.
pub fn build_registry(config: &ServerConfig) -> Arc<ToolRegistry> {
    let mut builder = ToolRegistry::builder();
    Arc::new(FfmpegToolset::from_config(config)).register(&mut builder);
    let registry = builder.build();
    info!(
        target: "ffmpeg_mcp::tools",
        tool_count = registry.len(),
        source_root = %config.sources.root.display(),
        "Registered tools"
    );
    Arc::new(registry)
}
