//! The five FFmpeg tools and the shared state their handlers close over.

pub mod execute;
pub mod screenshot;
pub mod source;

use std::{ffi::OsString, path::Path, sync::Arc};

use crate::{
    lib::process::ProcessRunner,
    server::config::{FfmpegConfig, ServerConfig},
    tools::{
        encoder::{ImageFormat, ToolOutput},
        registry::ToolRegistryBuilder,
    },
};

pub use execute::{CommandFlavor, CommandRequest, CommandResponse, FFMPEG_FIXED_FLAGS};
pub use screenshot::{screenshot_args, ScreenshotRequest};
pub use source::{SourcePathRequest, SourceTree};

pub const EXECUTE_FFMPEG: &str = "execute_ffmpeg";
pub const EXECUTE_FFPROBE: &str = "execute_ffprobe";
pub const GET_SOURCE_CODE: &str = "get_ffmpeg_source_code";
pub const LS_SOURCE_CODE: &str = "ls_ffmpeg_source_code";
pub const GET_SCREENSHOT: &str = "get_screenshot";

/// Tool names in the order they are advertised.
pub const TOOL_NAMES: [&str; 5] = [
    EXECUTE_FFMPEG,
    EXECUTE_FFPROBE,
    GET_SOURCE_CODE,
    LS_SOURCE_CODE,
    GET_SCREENSHOT,
];

const EXECUTE_FFMPEG_DESCRIPTION: &str =
    "Full list of ffmpeg command arguments. Example: ['ffmpeg', '-i', 'in.mp4', 'out.mp4']";
const EXECUTE_FFPROBE_DESCRIPTION: &str =
    "Full list of ffprobe command arguments. Example: ['ffprobe', 'in.mp4']";
const GET_SOURCE_CODE_DESCRIPTION: &str =
    "Returns file contents or an error message. Example: /libavfilter/src_movie.c";
const LS_SOURCE_CODE_DESCRIPTION: &str =
    "Returns files or an error message. Example: /libavfilter/";
const GET_SCREENSHOT_DESCRIPTION: &str = "Get a screenshot from a media file at a given timestamp. Parameters: file path and timestamp (format '00:00:00'). Return an Image object.";

/// Configured binaries, source tree, and process runner shared by every handler.
#[derive(Debug, Clone)]
pub struct FfmpegToolset {
    ffmpeg: FfmpegConfig,
    sources: SourceTree,
    runner: ProcessRunner,
}

impl FfmpegToolset {
    pub fn new(ffmpeg: FfmpegConfig, sources: SourceTree) -> Self {
        let runner = ProcessRunner::new(Some(ffmpeg.command_timeout()));
        Self {
            ffmpeg,
            sources,
            runner,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.ffmpeg.clone(),
            SourceTree::new(config.sources.root.clone()),
        )
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg.ffmpeg_path
    }

    /// Bare `ffmpeg`/`ffprobe` map to the configured binaries; anything else runs as given.
    pub fn resolve_program(&self, executable: String) -> OsString {
        match executable.as_str() {
            "ffmpeg" => self.ffmpeg.ffmpeg_path.clone().into_os_string(),
            "ffprobe" => self.ffmpeg.ffprobe_path.clone().into_os_string(),
            _ => executable.into(),
        }
    }

    /// Register all five tools on `builder`, in advertised order.
    pub fn register(self: Arc<Self>, builder: &mut ToolRegistryBuilder) {
        let toolset = self.clone();
        builder.register_typed(
            EXECUTE_FFMPEG,
            EXECUTE_FFMPEG_DESCRIPTION,
            move |request: CommandRequest| {
                let toolset = toolset.clone();
                async move {
                    let response = toolset
                        .execute_command(request, CommandFlavor::Ffmpeg)
                        .await?;
                    ToolOutput::structured(&response)
                }
            },
        );

        let toolset = self.clone();
        builder.register_typed(
            EXECUTE_FFPROBE,
            EXECUTE_FFPROBE_DESCRIPTION,
            move |request: CommandRequest| {
                let toolset = toolset.clone();
                async move {
                    let response = toolset
                        .execute_command(request, CommandFlavor::Ffprobe)
                        .await?;
                    ToolOutput::structured(&response)
                }
            },
        );

        let toolset = self.clone();
        builder.register_typed(
            GET_SOURCE_CODE,
            GET_SOURCE_CODE_DESCRIPTION,
            move |request: SourcePathRequest| {
                let toolset = toolset.clone();
                async move { toolset.sources.read_file(&request).map(ToolOutput::Text) }
            },
        );

        let toolset = self.clone();
        builder.register_typed(
            LS_SOURCE_CODE,
            LS_SOURCE_CODE_DESCRIPTION,
            move |request: SourcePathRequest| {
                let toolset = toolset.clone();
                async move { toolset.sources.list_dir(&request).map(ToolOutput::List) }
            },
        );

        let toolset = self;
        builder.register_typed(
            GET_SCREENSHOT,
            GET_SCREENSHOT_DESCRIPTION,
            move |request: ScreenshotRequest| {
                let toolset = toolset.clone();
                async move {
                    let data = toolset.extract_screenshot(request).await?;
                    Ok(ToolOutput::Image {
                        data,
                        format: ImageFormat::Png,
                    })
                }
            },
        );
    }
}
