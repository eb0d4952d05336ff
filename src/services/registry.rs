//! In-memory registry of live chain build executions.
//!
//! Executions are keyed by id in a [`DashMap`]. Every mutation runs while
//! holding that entry's write guard, so the package sets and the result map
//! of one execution change together. Different executions never contend.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::info;

use crate::models::{ChainBuildExecution, ChainBuildPlan};

use super::error::{ExecutionError, ExecutionResult};

#[derive(Debug, Default)]
pub struct ExecutionRegistry {
    executions: DashMap<String, ChainBuildExecution>,
    sequence: AtomicU32,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending execution of `plan` and returns its id.
    pub fn start(&self, plan: ChainBuildPlan) -> String {
        let execution_id = self.generate_execution_id();
        let plan = Arc::new(plan);
        info!(
            execution_id = %execution_id,
            plan_id = plan.plan_id(),
            packages = plan.total_packages(),
            "registered chain build execution"
        );
        self.executions.insert(
            execution_id.clone(),
            ChainBuildExecution::new(execution_id.clone(), plan),
        );
        execution_id
    }

    /// Runs `f` against a shared view of the execution.
    pub fn read<R>(
        &self,
        execution_id: &str,
        f: impl FnOnce(&ChainBuildExecution) -> R,
    ) -> ExecutionResult<R> {
        let execution = self
            .executions
            .get(execution_id)
            .ok_or_else(|| ExecutionError::NotFound(execution_id.to_string()))?;
        Ok(f(&execution))
    }

    /// Runs `f` with exclusive access to the execution.
    pub fn update<R>(
        &self,
        execution_id: &str,
        f: impl FnOnce(&mut ChainBuildExecution) -> ExecutionResult<R>,
    ) -> ExecutionResult<R> {
        let mut execution = self
            .executions
            .get_mut(execution_id)
            .ok_or_else(|| ExecutionError::NotFound(execution_id.to_string()))?;
        f(&mut execution)
    }

    pub fn remove(&self, execution_id: &str) -> Option<ChainBuildExecution> {
        self.executions
            .remove(execution_id)
            .map(|(_, execution)| execution)
    }

    /// Ids of all registered executions, sorted.
    pub fn execution_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.executions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.executions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    /// 8 hex digits of wall clock plus a per-registry sequence number.
    fn generate_execution_id(&self) -> String {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let timestamp = (duration.as_secs() as u32) ^ duration.subsec_nanos();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{:08x}-{}", timestamp, sequence)
    }
}
