//! System health and status handlers.

use axum::Json;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

/// Service identification returned by the root endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    /// Service name
    #[schema(example = "hrungnir")]
    pub name: String,
    /// Crate version
    pub version: String,
    /// Path of the Streamable HTTP MCP endpoint
    #[schema(example = "/mcp")]
    pub mcp_endpoint: String,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(example = "ok")]
    pub status: String,
}

/// Service information
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    )
)]
#[instrument]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mcp_endpoint: "/mcp".to_string(),
    })
}

/// Health check endpoint
///
/// Returns the current health status of the server
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
#[instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
