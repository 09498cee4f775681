//! Result encoding: tagged handler output → MCP `CallToolResult`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::Serialize;
use serde_json::Value;

use crate::lib::errors::ToolError;

/// Image formats a handler can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

impl ImageFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
        }
    }
}

/// Value produced by a tool handler, before it is framed for the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Structured(JsonObject),
    List(Vec<String>),
    Image { data: Vec<u8>, format: ImageFormat },
}

impl ToolOutput {
    /// Serialize a record into `Structured`; the record must serialize to a JSON object.
    pub fn structured<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(object)) => Ok(ToolOutput::Structured(object)),
            Ok(other) => Err(ToolError::handler_failed(format!(
                "structured output must be a JSON object, got {other}"
            ))),
            Err(err) => Err(ToolError::handler_failed(format!(
                "failed to serialize structured output: {err}"
            ))),
        }
    }
}

/// Key used when a non-object value is wrapped as structured content.
pub const LIST_RESULT_KEY: &str = "result";

/// Encode a successful output.
pub fn encode(output: ToolOutput) -> CallToolResult {
    match output {
        ToolOutput::Text(text) => CallToolResult::success(vec![Content::text(text)]),
        ToolOutput::Structured(object) => CallToolResult::structured(Value::Object(object)),
        ToolOutput::List(items) => {
            let mut object = JsonObject::new();
            object.insert(
                LIST_RESULT_KEY.into(),
                Value::Array(items.into_iter().map(Value::String).collect()),
            );
            CallToolResult::structured(Value::Object(object))
        }
        ToolOutput::Image { data, format } => CallToolResult::success(vec![Content::image(
            STANDARD.encode(data),
            format.mime_type(),
        )]),
    }
}

/// Encode a failed call as a structured error result (`isError: true`).
pub fn encode_error(error: &ToolError, tool: &str) -> CallToolResult {
    CallToolResult::structured_error(error.to_payload(Some(tool)))
}

/// Encode a full dispatch outcome.
pub fn encode_outcome(outcome: Result<ToolOutput, ToolError>, tool: &str) -> CallToolResult {
    match outcome {
        Ok(output) => encode(output),
        Err(error) => encode_error(&error, tool),
    }
}

/// Decode the base64 payload of an image content back to raw bytes.
pub fn decode_image_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}
