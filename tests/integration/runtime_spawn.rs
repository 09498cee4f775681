use std::time::Duration;

use anyhow::Result;
use rmcp::{model::ClientInfo, serve_client};
use serde_json::Value;
use tokio::{process::Command, time::timeout};

use ffmpeg_mcp::tools::ffmpeg::TOOL_NAMES;

use crate::common::{fixture, spawn_server_process, BINARY_PATH};

#[tokio::test]
async fn spawned_binary_lists_the_five_tools() -> Result<()> {
    let (mut child, transport, stderr_task) =
        spawn_server_process(fixture("tests/fixtures/config_valid.toml")).await?;

    let client = serve_client(ClientInfo::default(), transport).await?;
    let list = client.list_tools(None).await?;
    let names = list
        .tools
        .iter()
        .map(|tool| tool.name.as_ref())
        .collect::<Vec<_>>();
    assert_eq!(names, TOOL_NAMES.to_vec(), "tools: {:?}", list.tools);

    client.cancel().await?;
    let status = timeout(Duration::from_secs(5), child.wait()).await??;
    assert!(
        status.success(),
        "server should exit cleanly but exit status was {status:?}"
    );
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }
    Ok(())
}

#[tokio::test]
async fn invalid_config_fails_startup_with_field_name() -> Result<()> {
    let output = timeout(
        Duration::from_secs(10),
        Command::new(BINARY_PATH)
            .env(
                "MCP_CONFIG_PATH",
                fixture("tests/fixtures/config_invalid_port.toml"),
            )
            .stdin(std::process::Stdio::null())
            .output(),
    )
    .await??;

    assert!(!output.status.success(), "status: {:?}", output.status);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("server.port"), "stderr: {stderr}");
    Ok(())
}

#[tokio::test]
async fn doctor_prints_a_json_report_and_exits_zero() -> Result<()> {
    let output = timeout(
        Duration::from_secs(30),
        Command::new(BINARY_PATH)
            .arg("--config")
            .arg(fixture("tests/fixtures/config_valid.toml"))
            .arg("doctor")
            .stdin(std::process::Stdio::null())
            .output(),
    )
    .await??;

    assert!(output.status.success(), "status: {:?}", output.status);
    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert!(report["ok"].is_boolean(), "report: {report}");
    assert_eq!(report["source_root"]["is_dir"], Value::Bool(true));
    assert!(
        report["source_root"]["path"]
            .as_str()
            .is_some_and(|path| path.ends_with("ffmpeg_src")),
        "report: {report}"
    );
    Ok(())
}
