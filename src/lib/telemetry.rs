//! Telemetry initialization and tool-call span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr; stdout belongs to the MCP stdio transport.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record start and finish of a single tool call.
pub struct ToolCallSpan {
    span: Span,
    started_at: Instant,
    call_id: Uuid,
}

impl ToolCallSpan {
    /// Start a span for `tool`.
    pub fn start(tool: &str) -> Self {
        let call_id = Uuid::new_v4();
        let span = info_span!(
            target: "ffmpeg_mcp::tools",
            "tool_call",
            %call_id,
            tool
        );
        Self {
            span,
            started_at: Instant::now(),
            call_id,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// Close the span while recording status and elapsed time.
    pub fn finish(self, status: &'static str) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        if status == "ok" {
            info!(
                target: "ffmpeg_mcp::tools",
                call_id = %self.call_id,
                status,
                elapsed_ms,
                "Completed tool call"
            );
        } else {
            warn!(
                target: "ffmpeg_mcp::tools",
                call_id = %self.call_id,
                status,
                elapsed_ms,
                "Tool call failed"
            );
        }
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub config_path: &'a str,
    pub source_root: &'a str,
    pub tool_count: usize,
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    info!(
        target: "ffmpeg_mcp::runtime",
        transport = telemetry.transport,
        host = telemetry.host.unwrap_or(""),
        port = telemetry.port.unwrap_or_default(),
        config_path = telemetry.config_path,
        source_root = telemetry.source_root,
        tool_count = telemetry.tool_count,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
