//! Model Context Protocol (MCP) server implementation
//!
//! The server is reachable over Streamable HTTP (nested into the API router)
//! or over stdio. Both transports share the same handler type.
//!
//! - **server**: handler coordinator, combines the routers below
//! - **tools**: tool routers, one file per concern
//!   - system: connectivity check
//!   - specfile: spec file queries
//!   - chain_builds: planning and tracking chain build executions
//! - **prompts**: prompt templates for packaging workflows

mod prompts;
pub mod server;
mod service;
pub mod tools;


pub use prompts::upstream::SetupUpstreamDevArgs;
pub use server::McpServer;
pub use service::{create_mcp_service, serve_stdio};
