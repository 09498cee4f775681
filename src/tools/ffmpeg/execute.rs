//! `execute_ffmpeg` / `execute_ffprobe`: run a caller-supplied command vector.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lib::{errors::ToolError, process::ProcessResult};

use super::FfmpegToolset;

/// Flags appended to every `execute_ffmpeg` call: quieter logs, overwrite without prompting.
pub const FFMPEG_FIXED_FLAGS: &[&str] = &["-v", "warning", "-y"];

/// Input for `execute_ffmpeg` and `execute_ffprobe`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandRequest {
    /// Full command vector; the first element is the executable.
    #[schemars(length(min = 1))]
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.args.is_empty() {
            return Err(ToolError::invalid_arguments(
                "args",
                "must contain at least the executable name",
            ));
        }
        Ok(())
    }
}

/// `{returncode, stdout, stderr}` as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandResponse {
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<ProcessResult> for CommandResponse {
    fn from(result: ProcessResult) -> Self {
        Self {
            returncode: result.exit_code,
            stdout: result.stdout_lossy(),
            stderr: result.stderr_lossy(),
        }
    }
}

/// Whether the run appends [`FFMPEG_FIXED_FLAGS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFlavor {
    Ffmpeg,
    Ffprobe,
}

impl FfmpegToolset {
    /// Run the command; a non-zero exit is returned as data, not as an error.
    pub async fn execute_command(
        &self,
        request: CommandRequest,
        flavor: CommandFlavor,
    ) -> Result<CommandResponse, ToolError> {
        request.validate()?;
        let mut args = request.args;
        let program = self.resolve_program(args.remove(0));
        if flavor == CommandFlavor::Ffmpeg {
            args.extend(FFMPEG_FIXED_FLAGS.iter().map(|flag| flag.to_string()));
        }

        let result = self.runner().run(&program, &args).await?;
        Ok(CommandResponse::from(result))
    }
}
