//! Connectivity check tool.

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::*, schemars,
    schemars::JsonSchema, tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::mcp::McpServer;

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct HelloParams {
    #[schemars(description = "Name to greet (default: World)")]
    pub name: Option<String>,
}

#[tool_router(router = system_router, vis = "pub(crate)")]
impl McpServer {
    #[tool(description = "Simple greeting to check that the server is reachable.")]
    pub async fn hello(&self, params: Parameters<HelloParams>) -> Result<CallToolResult, McpError> {
        let name = params.0.name.as_deref().unwrap_or("World");
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Hello, {name}! Hrungnir is ready to help with your packaging needs."
        ))]))
    }
}
