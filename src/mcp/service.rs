//! MCP transports
//!
//! Streamable HTTP for the API server, stdio for editor integrations.

use std::sync::Arc;

use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{
            StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
        },
    },
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::services::ExecutionRegistry;

use super::server::McpServer;

/// Create MCP Streamable HTTP service
///
/// The returned service can be nested into an Axum router:
///
/// ```no_run
/// use std::sync::Arc;
///
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use hrungnir::mcp::create_mcp_service;
/// # use hrungnir::services::ExecutionRegistry;
///
/// let registry = Arc::new(ExecutionRegistry::new());
/// let mcp_service = create_mcp_service(registry, CancellationToken::new());
///
/// let app: Router = Router::new().nest_service("/mcp", mcp_service);
/// ```
pub fn create_mcp_service(
    registry: Arc<ExecutionRegistry>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer, LocalSessionManager> {
    // One handler per session, all sharing the registry.
    // rmcp expects the factory to fail with io::Error.
    let service_factory = move || -> Result<McpServer, std::io::Error> {
        Ok(McpServer::new(Arc::clone(&registry)))
    };

    let config = StreamableHttpServerConfig::default()
        .with_stateful_mode(true)
        .with_cancellation_token(cancellation_token);

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(registry: Arc<ExecutionRegistry>) -> std::io::Result<()> {
    info!("Starting MCP server on stdio");
    let service = McpServer::new(registry)
        .serve(stdio())
        .await
        .map_err(std::io::Error::other)?;
    service.waiting().await.map_err(std::io::Error::other)?;
    info!("MCP stdio session closed");
    Ok(())
}
