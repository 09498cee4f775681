//! `get_screenshot`: decode one frame at a timestamp and return it as PNG bytes.

use std::ffi::OsString;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lib::errors::ToolError;

use super::FfmpegToolset;

/// Input for `get_screenshot`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScreenshotRequest {
    /// Media file to read.
    pub file_path: String,
    /// Seek position passed to `-ss`, e.g. `00:01:23`.
    pub timestamp: String,
}

/// Arguments (after the executable) that write a single PNG frame to stdout.
pub fn screenshot_args(request: &ScreenshotRequest) -> Vec<OsString> {
    [
        "-ss",
        request.timestamp.as_str(),
        "-i",
        request.file_path.as_str(),
        "-frames:v",
        "1",
        "-f",
        "image2pipe",
        "-vcodec",
        "png",
        "-v",
        "error",
        "-y",
        "-",
    ]
    .into_iter()
    .map(OsString::from)
    .collect()
}

impl FfmpegToolset {
    pub async fn extract_screenshot(&self, request: ScreenshotRequest) -> Result<Vec<u8>, ToolError> {
        let args = screenshot_args(&request);
        let result = self.runner().run(self.ffmpeg_path(), &args).await?;

        if !result.success() || result.stdout.is_empty() {
            return Err(ToolError::handler_failed(format!(
                "Failed to extract screenshot (exit={}): {}",
                result.exit_code,
                result.stderr_lossy().trim_end()
            )));
        }
        Ok(result.stdout)
    }
}
