use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer,
};

use crate::{
    server::config::ServerConfig,
    tools::{self, ToolCallRequest, ToolDispatcher, ToolRegistry},
};

/// MCP session handler. `tools/list` and `tools/call` are answered from the shared registry.
#[derive(Clone)]
pub struct FfmpegServer {
    dispatcher: ToolDispatcher,
    instructions: Arc<String>,
}

impl FfmpegServer {
    pub fn new(registry: Arc<ToolRegistry>, instructions: String) -> Self {
        Self {
            dispatcher: ToolDispatcher::new(registry),
            instructions: Arc::new(instructions),
        }
    }

    /// Registry built from `config`, with instructions left to the caller.
    pub fn from_config(config: &ServerConfig, instructions: String) -> Self {
        Self::new(tools::build_registry(config), instructions)
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }
}

impl ServerHandler for FfmpegServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .dispatcher
            .registry()
            .list()
            .map(|descriptor| descriptor.to_tool())
            .collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    /// Tool failures are returned as `isError` results; the session never sees a protocol error.
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.dispatcher.call(ToolCallRequest::from(request)).await)
    }
}
