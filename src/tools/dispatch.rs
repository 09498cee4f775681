//! Tool dispatch: lookup, argument validation, invocation, and encoding.

use std::sync::Arc;

use jsonschema::{error::ValidationErrorKind, JSONSchema, ValidationError};
use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject};
use serde_json::Value;
use tracing::{debug, Instrument};

use crate::{
    lib::{errors::ToolError, telemetry::ToolCallSpan},
    tools::{
        encoder::{self, ToolOutput},
        registry::ToolRegistry,
    },
};

/// One inbound tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub tool_name: String,
    pub arguments: JsonObject,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

impl From<CallToolRequestParam> for ToolCallRequest {
    fn from(param: CallToolRequestParam) -> Self {
        Self {
            tool_name: param.name.into_owned(),
            arguments: param.arguments.unwrap_or_default(),
        }
    }
}

/// Routes validated calls to registered handlers. Holds no per-call state.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch and encode the outcome for the transport.
    pub async fn call(&self, request: ToolCallRequest) -> CallToolResult {
        let tool_name = request.tool_name.clone();
        let outcome = self.dispatch(request).await;
        encoder::encode_outcome(outcome, &tool_name)
    }

    /// Look up, validate, and invoke. Unknown tools and invalid arguments never reach a handler.
    pub async fn dispatch(&self, request: ToolCallRequest) -> Result<ToolOutput, ToolError> {
        let call_span = ToolCallSpan::start(&request.tool_name);
        let span = call_span.span().clone();

        let outcome = async {
            let tool = self
                .registry
                .lookup(&request.tool_name)
                .ok_or_else(|| ToolError::UnknownTool {
                    name: request.tool_name.clone(),
                })?;
            if let Some(validator) = &tool.validator {
                validate_arguments(validator, &request.arguments)?;
            }
            debug!(
                target: "ffmpeg_mcp::tools",
                arguments = request.arguments.len(),
                "Invoking tool handler"
            );
            (tool.handler)(request.arguments).await
        }
        .instrument(span)
        .await;

        call_span.finish(match &outcome {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        });
        outcome
    }
}

/// Check `arguments` against a compiled input schema.
///
/// The first violation becomes `InvalidArguments`, named by its location in the argument
/// object (`args`, `args[1]`). A missing required property is named by the property itself.
pub fn validate_arguments(validator: &JSONSchema, arguments: &JsonObject) -> Result<(), ToolError> {
    let instance = Value::Object(arguments.clone());
    let outcome = match validator.validate(&instance) {
        Ok(()) => Ok(()),
        Err(mut errors) => Err(errors.next().map_or_else(
            || ToolError::invalid_arguments("arguments", "do not match the input schema"),
            invalid_argument,
        )),
    };
    outcome
}

fn invalid_argument(error: ValidationError<'_>) -> ToolError {
    let location = field_path(&error.instance_path.to_string());
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let property = property
                .as_str()
                .map_or_else(|| property.to_string(), str::to_owned);
            let field = if location.is_empty() {
                property
            } else {
                format!("{location}.{property}")
            };
            ToolError::invalid_arguments(field, "is required")
        }
        _ if location.is_empty() => ToolError::invalid_arguments("arguments", error.to_string()),
        _ => ToolError::invalid_arguments(location, error.to_string()),
    }
}

/// `/args/1` → `args[1]`, `/a/b` → `a.b`.
fn field_path(pointer: &str) -> String {
    let mut field = String::new();
    for segment in pointer.split('/').filter(|segment| !segment.is_empty()) {
        if segment.parse::<usize>().is_ok() {
            field.push('[');
            field.push_str(segment);
            field.push(']');
        } else {
            if !field.is_empty() {
                field.push('.');
            }
            field.push_str(segment);
        }
    }
    field
}
