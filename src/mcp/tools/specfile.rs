//! MCP tools for RPM spec files.

use std::path::Path;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::*, schemars,
    schemars::JsonSchema, tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::mcp::McpServer;
use crate::mcp::tools::map_specfile_error;
use crate::specfile;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetUpstreamUrlParams {
    #[schemars(description = "Path to the .spec file, usually inside a dist-git checkout")]
    pub specfile_path: String,
}

#[tool_router(router = specfile_router, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        description = "Read the upstream project URL from a spec file. Returns the URL tag with macros expanded, or an empty string when the spec file has no URL tag."
    )]
    pub async fn get_upstream_url(
        &self,
        params: Parameters<GetUpstreamUrlParams>,
    ) -> Result<CallToolResult, McpError> {
        let url = specfile::upstream_url(Path::new(&params.0.specfile_path))
            .map_err(map_specfile_error)?;

        Ok(CallToolResult::success(vec![Content::text(url)]))
    }
}
