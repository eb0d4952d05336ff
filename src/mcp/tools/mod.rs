//! MCP tool implementations
//!
//! Each file declares one tool router on [`McpServer`](super::McpServer);
//! the server merges them. Shared error mapping and response helpers live
//! here.

pub mod chain_builds;
pub mod specfile;
pub mod system;

#[cfg(test)]
mod specfile_test;

use rmcp::{ErrorData as McpError, model::*};
use serde::Serialize;
use serde_json::json;

use crate::models::PlanError;
use crate::services::ExecutionError;
use crate::specfile::SpecfileError;

/// Pretty-printed JSON as a single text content block.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(
            "serialization_failed",
            Some(json!({"error": e.to_string()})),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub(crate) fn map_plan_error(err: PlanError) -> McpError {
    McpError::invalid_params("invalid_plan", Some(json!({"error": err.to_string()})))
}

pub(crate) fn map_execution_error(err: ExecutionError) -> McpError {
    let data = Some(json!({"error": err.to_string()}));
    match err {
        ExecutionError::NotFound(_) => McpError::resource_not_found("execution_not_found", data),
        ExecutionError::UnknownPackage { .. } => McpError::invalid_params("unknown_package", data),
        ExecutionError::Plan(_) => McpError::invalid_params("invalid_plan", data),
        ref e if e.is_invalid_state() => McpError::invalid_params("invalid_state", data),
        _ => McpError::internal_error("execution_error", data),
    }
}

pub(crate) fn map_specfile_error(err: SpecfileError) -> McpError {
    let data = Some(json!({"error": err.to_string()}));
    match err {
        SpecfileError::NotFound(_) => McpError::resource_not_found("specfile_not_found", data),
        SpecfileError::MacroRecursion { .. } => McpError::invalid_params("invalid_specfile", data),
        SpecfileError::Read { .. } => McpError::internal_error("specfile_read_failed", data),
    }
}
