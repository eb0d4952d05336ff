//! Chain build execution errors.
//!
//! These are caller-protocol errors: the orchestration loop asked for a
//! transition that the execution state does not allow. Failed builds are not
//! errors; they flow through `mark_completed` as data.

use miette::Diagnostic;
use thiserror::Error;

use crate::models::{BuildStatus, PlanError};

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Package '{package}' is not part of plan '{plan_id}'")]
    #[diagnostic(code(hrungnir::execution::unknown_package))]
    UnknownPackage { package: String, plan_id: String },

    #[error("Package '{package}' is already running")]
    #[diagnostic(
        code(hrungnir::execution::already_running),
        help("A package must be started at most once before it reports a result")
    )]
    AlreadyRunning { package: String },

    #[error("Package '{package}' already finished with status '{status}'")]
    #[diagnostic(
        code(hrungnir::execution::already_finished),
        help("Use retry to rebuild a failed package")
    )]
    AlreadyFinished { package: String, status: BuildStatus },

    #[error("Execution '{execution_id}' is already {status}")]
    #[diagnostic(code(hrungnir::execution::complete))]
    ExecutionComplete {
        execution_id: String,
        status: BuildStatus,
    },

    #[error("Package '{package}' has not failed and cannot be retried")]
    #[diagnostic(code(hrungnir::execution::not_failed))]
    NotFailed { package: String },

    #[error("Chain build execution '{0}' not found")]
    #[diagnostic(code(hrungnir::execution::not_found))]
    NotFound(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Plan(#[from] PlanError),
}

impl ExecutionError {
    /// Whether this error reports a transition the current state forbids.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            ExecutionError::AlreadyRunning { .. }
                | ExecutionError::AlreadyFinished { .. }
                | ExecutionError::ExecutionComplete { .. }
                | ExecutionError::NotFailed { .. }
        )
    }
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
