//! Subprocess bridge: run an executable with an exact argument vector and capture its output.

use std::{
    ffi::OsStr,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{process::Command, time};
use tracing::{debug, warn};

use crate::lib::errors::ProcessError;

/// Exit code reported when the executable could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// Captured outcome of one process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    fn spawn_failure(program: &str, err: &std::io::Error) -> Self {
        Self {
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            stdout: Vec::new(),
            stderr: format!("failed to start `{program}`: {err}").into_bytes(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Stateless runner; each `run` owns its child and buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Spawn `program` with `args` (no shell), wait for it, and capture stdout/stderr.
    ///
    /// A spawn failure is reported as a `ProcessResult` with exit code -1 and the reason on
    /// stderr. Exceeding the timeout kills the child and returns `ProcessError::TimedOut`.
    /// Dropping the returned future also kills the child.
    pub async fn run<S: AsRef<OsStr>>(
        &self,
        program: impl AsRef<OsStr>,
        args: &[S],
    ) -> Result<ProcessResult, ProcessError> {
        let program = program.as_ref();
        let program_name = program.to_string_lossy().into_owned();

        let mut command = Command::new(program);
        command
            .args(args)
            // Never let the child read the MCP stdio channel.
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(
                    target: "ffmpeg_mcp::process",
                    program = %program_name,
                    error = %err,
                    "Failed to spawn process"
                );
                return Ok(ProcessResult::spawn_failure(&program_name, &err));
            }
        };
        debug!(
            target: "ffmpeg_mcp::process",
            program = %program_name,
            args = args.len(),
            pid = child.id(),
            "Spawned process"
        );

        let output = match self.timeout {
            Some(limit) => time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ProcessError::TimedOut {
                    program: program_name.clone(),
                    timeout: limit,
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| ProcessError::Wait {
            program: program_name.clone(),
            source,
        })?;

        let exit_code = exit_code_of(output.status);
        debug!(
            target: "ffmpeg_mcp::process",
            program = %program_name,
            exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Process finished"
        );

        Ok(ProcessResult {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    SPAWN_FAILURE_EXIT_CODE
}
