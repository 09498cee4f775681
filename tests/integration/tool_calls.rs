use anyhow::Result;
use serde_json::{json, Value};

use ffmpeg_mcp::tools::encoder::decode_image_data;

use crate::common::{call_json, connect_in_process, fixture_config};

#[tokio::test]
async fn tools_list_advertises_object_schemas() -> Result<()> {
    let (client, server_task) = connect_in_process(&fixture_config()).await?;

    let list = client.list_tools(None).await?;
    assert_eq!(list.tools.len(), 5);
    for tool in &list.tools {
        assert_eq!(
            tool.input_schema.get("type"),
            Some(&json!("object")),
            "{}",
            tool.name
        );
        assert!(tool.description.is_some(), "{}", tool.name);
    }

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_a_structured_error() -> Result<()> {
    let (client, server_task) = connect_in_process(&fixture_config()).await?;

    let value = call_json(&client, "transcode_everything", json!({})).await?;
    let _ = client.cancel().await;
    let _ = server_task.await;

    assert_eq!(value.get("isError"), Some(&json!(true)));
    assert_eq!(
        value.pointer("/structuredContent/code"),
        Some(&json!("unknown_tool"))
    );
    assert_eq!(
        value.pointer("/structuredContent/tool"),
        Some(&json!("transcode_everything"))
    );
    Ok(())
}

#[tokio::test]
async fn source_tools_browse_the_fixture_tree() -> Result<()> {
    let (client, server_task) = connect_in_process(&fixture_config()).await?;

    let listing = call_json(
        &client,
        "ls_ffmpeg_source_code",
        json!({ "path": "/libavfilter/" }),
    )
    .await?;
    let source = call_json(
        &client,
        "get_ffmpeg_source_code",
        json!({ "path": "/libavfilter/a.c" }),
    )
    .await?;
    let missing = call_json(
        &client,
        "get_ffmpeg_source_code",
        json!({ "path": "/libavfilter/missing.c" }),
    )
    .await?;
    let traversal = call_json(
        &client,
        "get_ffmpeg_source_code",
        json!({ "path": "/../config_valid.toml" }),
    )
    .await?;
    let _ = client.cancel().await;
    let _ = server_task.await;

    assert_eq!(
        listing.get("structuredContent"),
        Some(&json!({ "result": ["a.c", "b.c"] }))
    );

    let text = source
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(text.contains("int a(void)"), "{source}");

    let text = missing
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(text.starts_with("Invalid path: "), "{missing}");
    assert!(text.contains("missing.c"), "{missing}");
    assert_ne!(missing.get("isError"), Some(&json!(true)));

    assert_eq!(traversal.get("isError"), Some(&json!(true)));
    assert_eq!(
        traversal.pointer("/structuredContent/code"),
        Some(&json!("invalid_arguments"))
    );
    Ok(())
}

#[tokio::test]
async fn execution_tools_validate_and_run() -> Result<()> {
    let (client, server_task) = connect_in_process(&fixture_config()).await?;

    let empty = call_json(&client, "execute_ffmpeg", json!({ "args": [] })).await?;
    let wrong_type = call_json(&client, "execute_ffprobe", json!({ "args": "ffprobe in.mp4" })).await?;
    let echoed = call_json(&client, "execute_ffprobe", json!({ "args": ["echo", "hi"] })).await?;
    let _ = client.cancel().await;
    let _ = server_task.await;

    for value in [&empty, &wrong_type] {
        assert_eq!(value.get("isError"), Some(&json!(true)), "{value}");
        assert_eq!(
            value.pointer("/structuredContent/code"),
            Some(&json!("invalid_arguments"))
        );
        assert_eq!(
            value.pointer("/structuredContent/details/field"),
            Some(&json!("args"))
        );
    }

    assert_eq!(
        echoed.get("structuredContent"),
        Some(&json!({ "returncode": 0, "stderr": "", "stdout": "hi\n" }))
    );
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn screenshot_returns_png_image_content() -> Result<()> {
    use std::{fs, os::unix::fs::PermissionsExt};

    let temp = tempfile::tempdir()?;
    let fake = temp.path().join("ffmpeg");
    fs::write(&fake, "#!/bin/sh\nprintf '\\211PNG\\r\\n\\032\\n'\n")?;
    fs::set_permissions(&fake, fs::Permissions::from_mode(0o755))?;

    let mut config = fixture_config();
    config.ffmpeg.ffmpeg_path = fake;
    let (client, server_task) = connect_in_process(&config).await?;

    let value = call_json(
        &client,
        "get_screenshot",
        json!({ "file_path": "in.mp4", "timestamp": "00:00:01" }),
    )
    .await?;
    let _ = client.cancel().await;
    let _ = server_task.await;

    assert_eq!(value.pointer("/content/0/type"), Some(&json!("image")));
    assert_eq!(
        value.pointer("/content/0/mimeType"),
        Some(&json!("image/png"))
    );
    let data = value
        .pointer("/content/0/data")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert_eq!(decode_image_data(data)?, b"\x89PNG\r\n\x1a\n".to_vec());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failing_screenshot_is_handler_failure_with_stderr() -> Result<()> {
    use std::{fs, os::unix::fs::PermissionsExt};

    let temp = tempfile::tempdir()?;
    let fake = temp.path().join("ffmpeg");
    fs::write(
        &fake,
        "#!/bin/sh\necho 'in.mp4: Invalid data found when processing input' >&2\nexit 1\n",
    )?;
    fs::set_permissions(&fake, fs::Permissions::from_mode(0o755))?;

    let mut config = fixture_config();
    config.ffmpeg.ffmpeg_path = fake;
    let (client, server_task) = connect_in_process(&config).await?;

    let value = call_json(
        &client,
        "get_screenshot",
        json!({ "file_path": "in.mp4", "timestamp": "00:00:01" }),
    )
    .await?;
    let _ = client.cancel().await;
    let _ = server_task.await;

    assert_eq!(value.get("isError"), Some(&json!(true)));
    assert_eq!(
        value.pointer("/structuredContent/code"),
        Some(&json!("handler_failed"))
    );
    let reason = value
        .pointer("/structuredContent/details/reason")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(reason.contains("Invalid data found"), "{value}");
    Ok(())
}
