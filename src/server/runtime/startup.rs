use std::process::ExitCode;

use anyhow::{Context, Error};
use rmcp::ServiceExt;
use tokio::net::TcpListener;

use crate::{
    cli::{LaunchProfile, TransportMode},
    lib::telemetry::{emit_runtime_mode, RuntimeModeTelemetry},
    server::{
        config::ServerConfig,
        runtime::{build_instructions, FfmpegServer},
    },
    tools,
};

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn report(self) -> ExitCode {
        eprintln!("{}", self.message);
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

/// Start the MCP server and select stdio/TCP based on the launch profile.
pub async fn run_server(profile: LaunchProfile, config: ServerConfig) -> Result<(), RuntimeExit> {
    let registry = tools::build_registry(&config);
    let instructions = build_instructions(&profile, &config, &registry);
    let tool_count = registry.len();
    let server = FfmpegServer::new(registry, instructions);

    emit_runtime_mode(&RuntimeModeTelemetry {
        transport: profile.transport.as_str(),
        host: matches!(profile.transport, TransportMode::Tcp).then_some(config.server.host.as_str()),
        port: matches!(profile.transport, TransportMode::Tcp).then_some(config.server.port),
        config_path: config.source_path.to_string_lossy().as_ref(),
        source_root: config.sources.root.to_string_lossy().as_ref(),
        tool_count,
        launch_args: &profile.launch_args,
    });

    match profile.transport {
        TransportMode::Stdio => run_stdio(server).await,
        TransportMode::Tcp => run_tcp(server, &config).await,
    }
}

async fn run_stdio(server: FfmpegServer) -> Result<(), RuntimeExit> {
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(RuntimeExit::from_error)?;
    running.waiting().await.map_err(RuntimeExit::from_error)?;
    tracing::info!(target: "ffmpeg_mcp::runtime", "stdio session closed");
    Ok(())
}

/// Serve one client connection at a time until the listener fails.
async fn run_tcp(server: FfmpegServer, config: &ServerConfig) -> Result<(), RuntimeExit> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind TCP port {addr}"))
        .map_err(RuntimeExit::from_error)?;
    tracing::info!(
        target: "ffmpeg_mcp::runtime",
        transport = "tcp",
        bind_addr = %addr,
        "Started listening in TCP mode"
    );

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .with_context(|| format!("failed to accept TCP connection ({addr})"))
            .map_err(RuntimeExit::from_error)?;
        tracing::info!(
            target: "ffmpeg_mcp::runtime",
            peer = %peer,
            "Accepted connection from MCP client"
        );

        // A failed handshake or dropped client ends that session only.
        let running = match server.clone().serve(stream).await {
            Ok(running) => running,
            Err(err) => {
                tracing::warn!(
                    target: "ffmpeg_mcp::runtime",
                    peer = %peer,
                    error = %err,
                    "MCP handshake failed"
                );
                continue;
            }
        };
        if let Err(err) = running.waiting().await {
            tracing::warn!(
                target: "ffmpeg_mcp::runtime",
                peer = %peer,
                error = %err,
                "MCP session ended with an error"
            );
        }
    }
}
