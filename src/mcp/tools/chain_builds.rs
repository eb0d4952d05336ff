//! MCP tools for chain build planning and execution tracking.
//!
//! The orchestration loop lives in the client: it asks for the next ready
//! packages, submits them to the build system, and reports back with
//! `mark_chain_build_started` / `mark_chain_build_completed`.

use std::collections::BTreeMap;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::*, schemars,
    schemars::JsonSchema, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::mcp::McpServer;
use crate::mcp::tools::{json_result, map_execution_error, map_plan_error};
use crate::models::{
    BuildConfiguration, BuildEstimate, BuildResult, BuildStatus, BuildTarget, ChainBuildExecution,
    ChainBuildPlan, ChainBuildStrategy,
};
use crate::services::ChainBuildPlanner;

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlanChainBuildParams {
    #[schemars(description = "Identifier for the new plan")]
    pub plan_id: String,
    #[schemars(description = "Koji target tag, e.g. 'c10s-build'")]
    pub target_tag: String,
    #[schemars(description = "Packages that triggered the rebuild (optional)")]
    pub root_packages: Option<Vec<String>>,
    #[schemars(description = "Every package to rebuild")]
    pub packages: Vec<String>,
    #[schemars(
        description = "Package -> packages it needs built first. Dependencies outside 'packages' are treated as already built."
    )]
    pub dependencies: Option<BTreeMap<String, Vec<String>>>,
    #[schemars(description = "Package -> estimated build time in minutes (optional)")]
    pub estimated_minutes: Option<BTreeMap<String, u32>>,
    #[schemars(
        description = "Strategy: 'sequential', 'parallel_groups' (default), 'aggressive_parallel', 'conservative'"
    )]
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StartChainBuildParams {
    #[schemars(
        description = "Plan document as returned by plan_chain_build. Needs at least plan_id, target_tag and build_groups."
    )]
    pub plan: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionParams {
    #[schemars(description = "Execution ID returned by start_chain_build")]
    pub execution_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PackageParams {
    #[schemars(description = "Execution ID returned by start_chain_build")]
    pub execution_id: String,
    #[schemars(description = "Package name as listed in the plan")]
    pub package_name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MarkCompletedParams {
    #[schemars(description = "Execution ID returned by start_chain_build")]
    pub execution_id: String,
    #[schemars(description = "Package name as listed in the plan")]
    pub package_name: String,
    #[schemars(
        description = "Build outcome: 'success', 'failed', 'canceled' or 'skipped'. Anything but 'success' fails the execution."
    )]
    pub status: String,
    #[schemars(description = "Koji build ID (optional)")]
    pub build_id: Option<u64>,
    #[schemars(description = "Koji task ID (optional)")]
    pub koji_task_id: Option<u64>,
    #[schemars(description = "Build log URL (optional)")]
    pub log_url: Option<String>,
    #[schemars(description = "Failure details (optional)")]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CancelChainBuildParams {
    #[schemars(description = "Execution ID returned by start_chain_build")]
    pub execution_id: String,
    #[schemars(description = "Why the chain build is abandoned (optional)")]
    pub reason: Option<String>,
}

// =============================================================================
// Chain Build Tools
// =============================================================================

#[tool_router(router = chain_build_router, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        description = "Group packages into dependency-ordered build waves. Returns the plan document to pass to start_chain_build. Fails on dependency cycles."
    )]
    pub async fn plan_chain_build(
        &self,
        params: Parameters<PlanChainBuildParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let mut dependencies = params.dependencies.unwrap_or_default();

        let mut planner = ChainBuildPlanner::new();
        for package in &params.packages {
            planner.add_package(package, dependencies.remove(package).unwrap_or_default());
        }
        if !dependencies.is_empty() {
            let unknown: Vec<&String> = dependencies.keys().collect();
            return Err(McpError::invalid_params(
                "unknown_package",
                Some(json!({
                    "error": "dependencies name packages that are not in 'packages'",
                    "packages": unknown,
                })),
            ));
        }
        for (package, minutes) in params.estimated_minutes.unwrap_or_default() {
            planner.add_estimate(BuildEstimate::new(package, minutes));
        }

        let strategy = match params.strategy.as_deref() {
            Some(s) => s.parse::<ChainBuildStrategy>().map_err(|e| {
                McpError::invalid_params(
                    "invalid_strategy",
                    Some(json!({"error": e.to_string()})),
                )
            })?,
            None => ChainBuildStrategy::default(),
        };

        let plan = planner
            .plan(params.plan_id, params.target_tag)
            .and_then(|builder| {
                builder
                    .root_packages(params.root_packages.unwrap_or_default())
                    .strategy(strategy)
                    .build()
            })
            .map_err(map_plan_error)?;

        json_result(&plan)
    }

    #[tool(
        description = "Validate a chain build plan and start tracking a new execution of it. Returns the execution ID and the packages ready to build."
    )]
    pub async fn start_chain_build(
        &self,
        params: Parameters<StartChainBuildParams>,
    ) -> Result<CallToolResult, McpError> {
        let plan: ChainBuildPlan = serde_json::from_value(params.0.plan).map_err(|e| {
            McpError::invalid_params("invalid_plan", Some(json!({"error": e.to_string()})))
        })?;

        let execution_id = self.registry.start(plan);
        info!(execution_id = %execution_id, "chain build started via MCP");

        self.status(&execution_id)
    }

    #[tool(
        description = "Packages that can be submitted now: their wave's prerequisites are complete and they are not running, completed or failed. Empty once the execution is finished."
    )]
    pub async fn next_chain_build_packages(
        &self,
        params: Parameters<ExecutionParams>,
    ) -> Result<CallToolResult, McpError> {
        let ready = self
            .registry
            .read(&params.0.execution_id, |e| {
                json!({
                    "execution_id": e.execution_id(),
                    "status": e.current_status(),
                    "ready_packages": e.next_ready_packages(),
                })
            })
            .map_err(map_execution_error)?;

        json_result(&ready)
    }

    #[tool(
        description = "Record that a package was submitted to the build system. Fails if it is already running or finished."
    )]
    pub async fn mark_chain_build_started(
        &self,
        params: Parameters<PackageParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.registry
            .update(&params.execution_id, |e| e.mark_started(&params.package_name))
            .map_err(map_execution_error)?;

        self.status(&params.execution_id)
    }

    #[tool(
        description = "Record the outcome of a package build. Any failure fails the whole execution; it succeeds once every package succeeded."
    )]
    pub async fn mark_chain_build_completed(
        &self,
        params: Parameters<MarkCompletedParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let status = params
            .status
            .parse::<BuildStatus>()
            .ok()
            .filter(|s| !matches!(s, BuildStatus::Pending | BuildStatus::Running))
            .ok_or_else(|| {
                McpError::invalid_params(
                    "invalid_status",
                    Some(json!({
                        "error": format!("'{}' is not a build outcome", params.status),
                        "expected": ["success", "failed", "canceled", "skipped"],
                    })),
                )
            })?;

        self.registry
            .update(&params.execution_id, |e| {
                let config = result_config(e, &params.package_name);
                let mut result = BuildResult::new(&params.package_name, status, config);
                result.build_id = params.build_id;
                result.koji_task_id = params.koji_task_id;
                result.log_url = params.log_url.clone();
                result.error_message = params.error_message.clone();
                result.end_time = Some(chrono::Utc::now());
                e.mark_completed(&params.package_name, result)
            })
            .map_err(map_execution_error)?;

        self.status(&params.execution_id)
    }

    #[tool(
        description = "Make a failed package buildable again. When no failures remain the execution returns to 'running'."
    )]
    pub async fn retry_chain_build_package(
        &self,
        params: Parameters<PackageParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.registry
            .update(&params.execution_id, |e| e.retry_package(&params.package_name))
            .map_err(map_execution_error)?;

        self.status(&params.execution_id)
    }

    #[tool(description = "Abandon a chain build execution that has not finished yet.")]
    pub async fn cancel_chain_build(
        &self,
        params: Parameters<CancelChainBuildParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.registry
            .update(&params.execution_id, |e| e.cancel(params.reason.clone()))
            .map_err(map_execution_error)?;

        self.status(&params.execution_id)
    }

    #[tool(
        description = "Status of a chain build execution: overall status, progress, completed/failed/running packages and the packages ready to build."
    )]
    pub async fn get_chain_build_status(
        &self,
        params: Parameters<ExecutionParams>,
    ) -> Result<CallToolResult, McpError> {
        self.status(&params.0.execution_id)
    }
}

impl McpServer {
    fn status(&self, execution_id: &str) -> Result<CallToolResult, McpError> {
        let status = self
            .registry
            .read(execution_id, status_json)
            .map_err(map_execution_error)?;
        json_result(&status)
    }
}

fn status_json(execution: &ChainBuildExecution) -> serde_json::Value {
    json!({
        "execution_id": execution.execution_id(),
        "plan_id": execution.plan().plan_id(),
        "target_tag": execution.plan().target_tag(),
        "status": execution.current_status(),
        "progress_percentage": execution.progress_percentage(),
        "total_packages": execution.plan().total_packages(),
        "completed_packages": execution.completed_packages(),
        "failed_packages": execution.failed_packages(),
        "running_packages": execution.running_packages(),
        "ready_packages": execution.next_ready_packages(),
        "retry_count": execution.retry_count(),
        "started_at": execution.started_at(),
        "completed_at": execution.completed_at(),
        "error_message": execution.error_message(),
    })
}

/// Configuration recorded with a reported result: the plan's configuration
/// for the package, else an official build for the plan's target.
fn result_config(execution: &ChainBuildExecution, package_name: &str) -> BuildConfiguration {
    let plan = execution.plan();
    plan.build_config_for(package_name)
        .cloned()
        .unwrap_or_else(|| {
            let target = plan
                .target_tag()
                .parse::<BuildTarget>()
                .unwrap_or(BuildTarget::C10sBuild);
            BuildConfiguration::new(target)
        })
}
