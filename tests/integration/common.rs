use std::{io, path::PathBuf, process::Stdio};

use anyhow::{Context, Result};
use rmcp::{
    model::{CallToolRequestParam, ClientInfo, JsonObject},
    serve_client,
    service::RunningService,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

use ffmpeg_mcp::server::{config::ServerConfig, runtime::FfmpegServer};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_ffmpeg-mcp");

pub type TestClient = RunningService<RoleClient, ClientInfo>;

pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// Defaults with the source root pointed at the checked-in fixture tree.
pub fn fixture_config() -> ServerConfig {
    let mut config = ServerConfig::defaults(fixture("tests/fixtures/config_valid.toml"));
    config.sources.root = fixture("tests/fixtures/ffmpeg_src");
    config
}

/// Serve `config` in-process over a duplex pipe and connect a client to it.
pub async fn connect_in_process(
    config: &ServerConfig,
) -> Result<(TestClient, JoinHandle<Result<()>>)> {
    let server = FfmpegServer::from_config(config, "integration test server".into());
    let (server_transport, client_transport) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        Result::<_, anyhow::Error>::Ok(())
    });
    let client = serve_client(ClientInfo::default(), client_transport).await?;
    Ok((client, server_task))
}

/// Call `name` and return the serialized `CallToolResult`.
pub async fn call_json(client: &TestClient, name: &str, arguments: Value) -> Result<Value> {
    let arguments: JsonObject = match arguments {
        Value::Object(object) => object,
        other => anyhow::bail!("tool arguments must be an object, got {other}"),
    };
    let response = client
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(arguments),
        })
        .await
        .with_context(|| format!("tools/call {name} failed at the protocol level"))?;
    serde_json::to_value(&response).context("CallToolResult serializes")
}

pub async fn spawn_server_process(
    config_path: PathBuf,
) -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .env("MCP_CONFIG_PATH", config_path)
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().context("child stdout is piped")?;
    let stdin = child.stdin.take().context("child stdin is piped")?;
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

/// Child stdout/stdin joined into one duplex transport.
pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}
