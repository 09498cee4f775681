//! Tool registry: name → handler, description, and input schema.
//!
//! Tools are registered on a [`ToolRegistryBuilder`] during startup. `build()` turns it into a
//! read-only [`ToolRegistry`] that is shared across sessions without locking.

use std::{future::Future, pin::Pin, sync::Arc};

use jsonschema::{Draft, JSONSchema};
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{lib::errors::ToolError, tools::encoder::ToolOutput};

/// Future returned by a tool handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<ToolOutput, ToolError>> + Send>>;

/// Type-erased tool handler taking the validated argument object.
pub type ToolHandler = Arc<dyn Fn(JsonObject) -> HandlerFuture + Send + Sync>;

/// Public description of a registered tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    /// MCP `tools/list` entry for this tool.
    pub fn to_tool(&self) -> Tool {
        Tool::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        )
    }
}

/// A descriptor together with its compiled input schema and the handler that implements it.
#[derive(Clone)]
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    /// `None` when the advertised schema could not be compiled; arguments then go straight to
    /// the handler.
    pub validator: Option<Arc<JSONSchema>>,
    pub handler: ToolHandler,
}

/// Mutable registration phase. Re-registering a name overwrites the earlier entry in place.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonObject,
        handler: ToolHandler,
    ) -> &mut Self {
        let name = name.into();
        let validator = match compile_schema(&input_schema) {
            Ok(validator) => Some(Arc::new(validator)),
            Err(reason) => {
                warn!(
                    target: "ffmpeg_mcp::tools",
                    tool = %name,
                    reason = %reason,
                    "Input schema does not compile; arguments will not be validated"
                );
                None
            }
        };
        let entry = RegisteredTool {
            descriptor: ToolDescriptor {
                name,
                description: description.into(),
                input_schema: Arc::new(input_schema),
            },
            validator,
            handler,
        };

        match self
            .tools
            .iter_mut()
            .find(|existing| existing.descriptor.name == entry.descriptor.name)
        {
            Some(existing) => {
                warn!(
                    target: "ffmpeg_mcp::tools",
                    tool = %entry.descriptor.name,
                    "Tool registered twice; keeping the later handler"
                );
                *existing = entry;
            }
            None => self.tools.push(entry),
        }
        self
    }

    /// Register a handler whose arguments deserialize into `A`; the schema is derived from `A`.
    pub fn register_typed<A, F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ToolHandler = Arc::new(move |arguments: JsonObject| -> HandlerFuture {
            let handler = handler.clone();
            Box::pin(async move {
                let args: A = serde_json::from_value(serde_json::Value::Object(arguments))
                    .map_err(|err| ToolError::invalid_arguments("arguments", err.to_string()))?;
                handler(args).await
            })
        });
        self.register(name, description, schema_object_for::<A>(), erased)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

/// Read-only registry used while serving.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|tool| tool.descriptor.name == name)
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|tool| &tool.descriptor)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// JSON schema object for `A`, as advertised in `tools/list`.
pub fn schema_object_for<A: JsonSchema>() -> JsonObject {
    let schema = schemars::schema_for!(A);
    match serde_json::to_value(&schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => {
            let mut object = JsonObject::new();
            object.insert("type".into(), "object".into());
            object
        }
    }
}

/// Compile an advertised input schema into a reusable validator.
pub fn compile_schema(schema: &JsonObject) -> Result<JSONSchema, String> {
    let document = serde_json::Value::Object(schema.clone());
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&document)
        .map_err(|err| err.to_string());
    compiled
}
