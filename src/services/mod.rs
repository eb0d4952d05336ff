//! Chain build business logic.
//!
//! - **chain_build**: readiness queries and the execution state machine
//! - **planner**: groups a dependency graph into build waves
//! - **registry**: concurrent store of live executions used by the MCP tools

pub mod chain_build;
mod error;
pub mod planner;
pub mod registry;

#[cfg(test)]
mod chain_build_test;

pub use error::{ExecutionError, ExecutionResult};
pub use planner::ChainBuildPlanner;
pub use registry::ExecutionRegistry;
