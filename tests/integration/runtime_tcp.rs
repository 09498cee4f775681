use std::{path::Path, process::Stdio, time::Duration};

use anyhow::{bail, Context, Result};
use rmcp::{model::ClientInfo, serve_client};
use serde_json::json;
use tokio::{
    net::TcpStream,
    process::{Child, Command},
    time::{sleep, timeout},
};

use ffmpeg_mcp::tools::ffmpeg::TOOL_NAMES;

use crate::common::{call_json, fixture, BINARY_PATH};

/// A currently free port the config accepts (1024 and above).
fn free_port() -> Result<u16> {
    for _ in 0..16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        if port >= 1024 {
            return Ok(port);
        }
    }
    bail!("no unprivileged port available")
}

fn write_tcp_config(dir: &Path, port: u16) -> Result<std::path::PathBuf> {
    let root = fixture("tests/fixtures/ffmpeg_src");
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[server]\nhost = \"127.0.0.1\"\nport = {port}\n\n[sources]\nroot = \"{}\"\n",
            root.display().to_string().replace('\\', "\\\\")
        ),
    )?;
    Ok(path)
}

fn spawn_tcp_server(config_path: &Path) -> Result<Child> {
    Command::new(BINARY_PATH)
        .arg("--transport")
        .arg("tcp")
        .arg("--config")
        .arg(config_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .context("failed to spawn TCP server")
}

async fn connect_when_ready(port: u16) -> Result<TcpStream> {
    let mut last_error = None;
    for _ in 0..100 {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(stream) => return Ok(stream),
            Err(err) => last_error = Some(err),
        }
        sleep(Duration::from_millis(100)).await;
    }
    Err(last_error.map_or_else(
        || anyhow::anyhow!("server never listened on {port}"),
        anyhow::Error::from,
    ))
}

#[tokio::test]
async fn tcp_listener_serves_consecutive_clients() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let port = free_port()?;
    let config_path = write_tcp_config(temp.path(), port)?;
    let mut child = spawn_tcp_server(&config_path)?;

    let stream = timeout(Duration::from_secs(15), connect_when_ready(port)).await??;
    let first = serve_client(ClientInfo::default(), stream).await?;
    let list = first.list_tools(None).await?;
    let names = list
        .tools
        .iter()
        .map(|tool| tool.name.as_ref())
        .collect::<Vec<_>>();
    assert_eq!(names, TOOL_NAMES.to_vec());
    first.cancel().await?;

    let stream = timeout(Duration::from_secs(15), connect_when_ready(port)).await??;
    let second = serve_client(ClientInfo::default(), stream).await?;
    let listing = call_json(
        &second,
        "ls_ffmpeg_source_code",
        json!({ "path": "/libavfilter" }),
    )
    .await?;
    assert_eq!(
        listing.get("structuredContent"),
        Some(&json!({ "result": ["a.c", "b.c"] }))
    );
    second.cancel().await?;

    assert!(
        child.try_wait()?.is_none(),
        "listener should keep running after clients disconnect"
    );
    child.kill().await?;
    Ok(())
}

#[tokio::test]
async fn tcp_listener_survives_a_failed_handshake() -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let temp = tempfile::tempdir()?;
    let port = free_port()?;
    let config_path = write_tcp_config(temp.path(), port)?;
    let mut child = spawn_tcp_server(&config_path)?;

    let mut garbage = timeout(Duration::from_secs(15), connect_when_ready(port)).await??;
    garbage.write_all(b"this is not json-rpc\n").await?;
    garbage.shutdown().await?;
    drop(garbage);

    let stream = timeout(Duration::from_secs(15), connect_when_ready(port)).await??;
    let client = timeout(
        Duration::from_secs(15),
        serve_client(ClientInfo::default(), stream),
    )
    .await??;
    let list = client.list_tools(None).await?;
    assert_eq!(list.tools.len(), TOOL_NAMES.len());
    client.cancel().await?;

    child.kill().await?;
    Ok(())
}
