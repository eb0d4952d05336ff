//! Tests for spec file MCP tools

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{ErrorCode, RawContent};
use tempfile::TempDir;

use crate::mcp::McpServer;
use crate::mcp::tools::specfile::GetUpstreamUrlParams;
use crate::services::ExecutionRegistry;

fn server() -> McpServer {
    McpServer::new(Arc::new(ExecutionRegistry::new()))
}

#[tokio::test]
async fn test_get_upstream_url_expands_macros() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tmux.spec");
    std::fs::write(
        &path,
        "Name: tmux\nVersion: 3.4\nURL: https://github.com/%{name}/%{name}\n\n%prep\n",
    )
    .unwrap();

    let result = server()
        .get_upstream_url(Parameters(GetUpstreamUrlParams {
            specfile_path: path.display().to_string(),
        }))
        .await
        .expect("get_upstream_url should succeed");

    let text = match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    };
    assert_eq!(text, "https://github.com/tmux/tmux");
}

#[tokio::test]
async fn test_get_upstream_url_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = server()
        .get_upstream_url(Parameters(GetUpstreamUrlParams {
            specfile_path: dir.path().join("none.spec").display().to_string(),
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    assert_eq!(err.message, "specfile_not_found");
}
