use std::{io, path::PathBuf, time::Duration};

use config::ConfigError as ConfigLoaderError;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures of a tool call, returned to the client as structured error results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool `{name}`")]
    UnknownTool { name: String },
    #[error("Invalid argument `{field}`: {message}")]
    InvalidArguments { field: String, message: String },
    #[error("{message}")]
    HandlerFailed { message: String },
}

impl ToolError {
    pub fn invalid_arguments(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn handler_failed(message: impl Into<String>) -> Self {
        Self::HandlerFailed {
            message: message.into(),
        }
    }

    /// Short status label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::HandlerFailed { .. } => "handler_failed",
        }
    }

    /// Render the error into the structured payload sent back over MCP.
    pub fn to_payload(&self, tool: Option<&str>) -> Value {
        let builder = match self {
            ToolError::UnknownTool { name } => UNKNOWN_TOOL_ERROR
                .builder()
                .retryable(false)
                .details(serde_json::json!({ "name": name })),
            ToolError::InvalidArguments { field, message } => INVALID_ARGUMENTS_ERROR
                .builder()
                .retryable(false)
                .details(serde_json::json!({ "field": field, "reason": message })),
            ToolError::HandlerFailed { message } => HANDLER_FAILED_ERROR
                .builder()
                .retryable(true)
                .details(serde_json::json!({ "reason": message })),
        };
        let builder = match tool {
            Some(tool) => builder.with_context_field("tool", Value::String(tool.to_string())),
            None => builder,
        };
        builder.build().expect("tool error descriptors are valid")
    }
}

impl From<ProcessError> for ToolError {
    fn from(value: ProcessError) -> Self {
        ToolError::HandlerFailed {
            message: value.to_string(),
        }
    }
}

/// Failures of the process runner that are not represented as a `ProcessResult`.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("`{program}` did not finish within {timeout:?} and was killed")]
    TimedOut { program: String, timeout: Duration },
    #[error("Failed while waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Structured error metadata returned by MCP tools.
#[derive(Debug, Clone, Serialize)]
pub struct ToolErrorDescriptor {
    /// Error code.
    pub code: &'static str,
    /// User-facing message.
    pub message: &'static str,
    /// Recommended remediation.
    pub remediation: &'static str,
}

impl ToolErrorDescriptor {
    /// Simple constructor.
    pub const fn new(code: &'static str, message: &'static str, remediation: &'static str) -> Self {
        Self {
            code,
            message,
            remediation,
        }
    }

    /// Create a builder.
    pub fn builder(&self) -> ToolErrorDescriptorBuilder<'_> {
        ToolErrorDescriptorBuilder::new(self)
    }
}

/// Builder for error payloads that fails if required fields are missing.
pub struct ToolErrorDescriptorBuilder<'a> {
    descriptor: &'a ToolErrorDescriptor,
    retryable: Option<bool>,
    details: Option<Value>,
    extra_fields: Map<String, Value>,
}

impl<'a> ToolErrorDescriptorBuilder<'a> {
    pub fn new(descriptor: &'a ToolErrorDescriptor) -> Self {
        Self {
            descriptor,
            retryable: None,
            details: None,
            extra_fields: Map::new(),
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_context_field(mut self, key: &str, value: Value) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Result<Value, ToolErrorBuilderError> {
        if self.descriptor.remediation.trim().is_empty() {
            return Err(ToolErrorBuilderError::MissingRemediation {
                code: self.descriptor.code,
            });
        }
        let retryable = self
            .retryable
            .ok_or(ToolErrorBuilderError::MissingRetryable {
                code: self.descriptor.code,
            })?;

        let mut data = Map::new();
        data.insert("code".into(), Value::String(self.descriptor.code.into()));
        data.insert(
            "message".into(),
            Value::String(self.descriptor.message.into()),
        );
        data.insert(
            "remediation".into(),
            Value::String(self.descriptor.remediation.into()),
        );
        data.insert("retryable".into(), Value::Bool(retryable));
        if let Some(details) = self.details {
            data.insert("details".into(), details);
        }
        for (key, value) in self.extra_fields {
            data.insert(key, value);
        }

        Ok(Value::Object(data))
    }
}

/// Errors when required builder fields are missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolErrorBuilderError {
    #[error("retryable is missing (code={code})")]
    MissingRetryable { code: &'static str },
    #[error("remediation is empty (code={code})")]
    MissingRemediation { code: &'static str },
}

pub const UNKNOWN_TOOL_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "unknown_tool",
    "No tool is registered under the requested name",
    "Call tools/list and retry with one of the advertised tool names.",
);

pub const INVALID_ARGUMENTS_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "invalid_arguments",
    "The tool arguments do not match the declared input schema",
    "Check the field named in details against the tool's inputSchema.",
);

pub const HANDLER_FAILED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "handler_failed",
    "The tool ran but could not complete the request",
    "Review details.reason (captured stderr or filesystem error) and adjust the request.",
);
