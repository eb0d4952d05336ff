//! Chain build readiness queries and execution state transitions.
//!
//! Execution states:
//!
//! ```text
//! pending ──start──▶ running ──all succeeded──▶ success
//!    │                  │
//!    │                  └──any failure──▶ failed ──retry (no failures left)──▶ running
//!    └──────cancel──────┴──▶ canceled
//! ```
//!
//! Everything here is synchronous bookkeeping. Which packages actually build,
//! and where, is decided by the caller.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::models::{BuildGroup, BuildResult, BuildStatus, ChainBuildExecution, ChainBuildPlan};

use super::error::{ExecutionError, ExecutionResult};

impl ChainBuildPlan {
    /// Packages eligible to start given a set of completed packages.
    ///
    /// `completed` is arbitrary: it does not have to come from an execution,
    /// so callers can ask hypothetical questions. Groups are visited in plan
    /// order; a group contributes its not-yet-completed packages when all of
    /// its prerequisites are in `completed`. Names unknown to the plan are
    /// ignored. Plans are validated on construction, so no package is
    /// offered twice.
    pub fn ready_packages(&self, completed: &BTreeSet<String>) -> Vec<String> {
        self.build_groups()
            .iter()
            .filter(|group| group.is_unblocked_by(completed))
            .flat_map(|group| &group.packages)
            .filter(|package| !completed.contains(*package))
            .cloned()
            .collect()
    }

    /// The group containing `package_name`, if any.
    pub fn group_for(&self, package_name: &str) -> Option<&BuildGroup> {
        self.build_groups()
            .iter()
            .find(|group| group.contains(package_name))
    }
}

impl ChainBuildExecution {
    /// Packages the caller may submit now.
    ///
    /// Empty once the execution is complete. Running and failed packages are
    /// never offered; re-running a failed package needs an explicit
    /// [`retry_package`](Self::retry_package).
    pub fn next_ready_packages(&self) -> Vec<String> {
        if self.is_complete() {
            return Vec::new();
        }

        self.plan
            .ready_packages(&self.completed_packages)
            .into_iter()
            .filter(|package| {
                !self.running_packages.contains(package) && !self.failed_packages.contains(package)
            })
            .collect()
    }

    /// Records that `package_name` was submitted.
    ///
    /// The first start moves a pending execution to `running`.
    pub fn mark_started(&mut self, package_name: &str) -> ExecutionResult<()> {
        self.ensure_in_plan(package_name)?;
        self.ensure_not_complete()?;

        if self.running_packages.contains(package_name) {
            return Err(ExecutionError::AlreadyRunning {
                package: package_name.to_string(),
            });
        }
        if let Some(status) = self.terminal_status_of(package_name) {
            return Err(ExecutionError::AlreadyFinished {
                package: package_name.to_string(),
                status,
            });
        }

        self.running_packages.insert(package_name.to_string());
        if self.current_status == BuildStatus::Pending {
            self.current_status = BuildStatus::Running;
            self.started_at = Some(Utc::now());
            info!(execution_id = %self.execution_id, "chain build execution started");
        }
        debug!(execution_id = %self.execution_id, package = package_name, "package started");
        Ok(())
    }

    /// Records the terminal outcome of `package_name`.
    ///
    /// The package does not need to have been started. A second report for
    /// the same package replaces the first. Any failure fails the whole
    /// execution, even one that had already succeeded; the execution succeeds
    /// once every package of the plan has completed. A success report that
    /// clears the last failure reopens a failed execution, like
    /// [`retry_package`](Self::retry_package) does. A canceled execution keeps
    /// its status but still records results of builds that were in flight.
    pub fn mark_completed(
        &mut self,
        package_name: &str,
        result: BuildResult,
    ) -> ExecutionResult<()> {
        self.ensure_in_plan(package_name)?;

        self.running_packages.remove(package_name);
        if result.is_success() {
            self.failed_packages.remove(package_name);
            self.completed_packages.insert(package_name.to_string());
        } else {
            self.completed_packages.remove(package_name);
            self.failed_packages.insert(package_name.to_string());
        }
        debug!(
            execution_id = %self.execution_id,
            package = package_name,
            status = %result.status,
            "package finished"
        );
        self.build_results.insert(package_name.to_string(), result);

        self.refresh_status();
        Ok(())
    }

    /// Makes a failed package eligible again.
    ///
    /// Drops its recorded result and bumps `retry_count`. When no failures
    /// remain, a failed execution goes back to `running`.
    pub fn retry_package(&mut self, package_name: &str) -> ExecutionResult<()> {
        self.ensure_in_plan(package_name)?;
        if self.current_status == BuildStatus::Canceled {
            return Err(self.complete_error());
        }
        if !self.failed_packages.remove(package_name) {
            return Err(ExecutionError::NotFailed {
                package: package_name.to_string(),
            });
        }

        self.build_results.remove(package_name);
        self.retry_count += 1;
        self.refresh_status();
        info!(
            execution_id = %self.execution_id,
            package = package_name,
            retry_count = self.retry_count,
            "package queued for retry"
        );
        Ok(())
    }

    /// Abandons the execution.
    pub fn cancel(&mut self, reason: Option<String>) -> ExecutionResult<()> {
        self.ensure_not_complete()?;

        self.current_status = BuildStatus::Canceled;
        self.error_message = reason;
        self.completed_at = Some(Utc::now());
        info!(
            execution_id = %self.execution_id,
            running = self.running_packages.len(),
            "chain build execution canceled"
        );
        Ok(())
    }

    fn refresh_status(&mut self) {
        if self.current_status == BuildStatus::Canceled {
            return;
        }

        if !self.failed_packages.is_empty() {
            if self.current_status != BuildStatus::Failed {
                info!(
                    execution_id = %self.execution_id,
                    failed = ?self.failed_packages,
                    "chain build execution failed"
                );
                self.current_status = BuildStatus::Failed;
                self.completed_at = None;
            }
        } else if self.completed_packages.len() == self.plan.total_packages() {
            if self.current_status != BuildStatus::Success {
                self.current_status = BuildStatus::Success;
                self.completed_at = Some(Utc::now());
                info!(execution_id = %self.execution_id, "chain build execution succeeded");
            }
        } else if self.current_status == BuildStatus::Failed {
            // No failure left to hold the execution.
            self.current_status = BuildStatus::Running;
            self.completed_at = None;
            self.started_at.get_or_insert_with(Utc::now);
            info!(execution_id = %self.execution_id, "chain build execution resumed");
        }
    }

    fn terminal_status_of(&self, package_name: &str) -> Option<BuildStatus> {
        if self.completed_packages.contains(package_name) {
            Some(BuildStatus::Success)
        } else if self.failed_packages.contains(package_name) {
            Some(BuildStatus::Failed)
        } else {
            None
        }
    }

    fn ensure_in_plan(&self, package_name: &str) -> ExecutionResult<()> {
        if self.plan.contains_package(package_name) {
            Ok(())
        } else {
            Err(ExecutionError::UnknownPackage {
                package: package_name.to_string(),
                plan_id: self.plan.plan_id().to_string(),
            })
        }
    }

    fn ensure_not_complete(&self) -> ExecutionResult<()> {
        if self.is_complete() {
            Err(self.complete_error())
        } else {
            Ok(())
        }
    }

    fn complete_error(&self) -> ExecutionError {
        ExecutionError::ExecutionComplete {
            execution_id: self.execution_id.clone(),
            status: self.current_status,
        }
    }
}
