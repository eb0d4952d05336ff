//! MCP server implementation
//!
//! The tool and prompt routers are declared next to their handlers (see
//! [`super::tools`] and [`super::prompts`]) and merged here.

use std::sync::Arc;

use rmcp::{
    RoleServer, ServerHandler,
    handler::server::router::{prompt::PromptRouter, tool::ToolRouter},
    model::*,
    prompt_handler,
    service::RequestContext,
    tool_handler,
};

use crate::services::ExecutionRegistry;

/// MCP handler shared by every session.
///
/// Sessions are cheap clones: the execution registry is shared, so a chain
/// build started in one session can be driven from another.
#[derive(Clone)]
pub struct McpServer {
    pub(crate) registry: Arc<ExecutionRegistry>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl McpServer {
    pub fn new(registry: Arc<ExecutionRegistry>) -> Self {
        Self {
            registry,
            tool_router: Self::system_router()
                + Self::specfile_router()
                + Self::chain_build_router(),
            prompt_router: Self::upstream_prompt_router(),
        }
    }

    pub fn registry(&self) -> &ExecutionRegistry {
        &self.registry
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler(router = self.prompt_router)]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
        )
        .with_instructions(
            "Hrungnir MCP Server - RPM packaging helpers: read spec files, plan chain builds \
             and track their execution wave by wave",
        )
    }
}
