//! API route configuration.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::handlers::{self, HealthResponse, ServiceInfo};
use crate::mcp::create_mcp_service;
use crate::services::ExecutionRegistry;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hrungnir API",
        version = "0.1.0",
        description = "Packaging workflow helpers exposed over the Model Context Protocol",
        license(name = "GPL-2.0")
    ),
    paths(handlers::root, handlers::health),
    components(schemas(ServiceInfo, HealthResponse)),
    tags(
        (name = "system", description = "System health and status endpoints")
    )
)]
pub struct ApiDoc;

/// Create the router serving the system endpoints, the MCP endpoint and the docs.
///
/// Every MCP session shares `registry`; cancelling `ct` closes open sessions.
pub fn create_router(registry: Arc<ExecutionRegistry>, ct: CancellationToken) -> Router {
    let api = ApiDoc::openapi();

    let system_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health));

    system_routes
        .nest_service("/mcp", create_mcp_service(registry, ct))
        .merge(Scalar::with_url("/docs", api))
}
