use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::api::ApiError;
use crate::specfile::SpecfileError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(hrungnir::cli::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported plan file format: {}", path.display())]
    #[diagnostic(
        code(hrungnir::cli::unsupported_format),
        help("Plan files must end in .json, .yaml or .yml")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid plan in {}: {message}", path.display())]
    #[diagnostic(
        code(hrungnir::cli::invalid_plan),
        help(
            "A plan needs plan_id, target_tag and build_groups; dependencies may only name packages from earlier groups"
        )
    )]
    InvalidPlan { path: PathBuf, message: String },

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hrungnir::cli::output))]
    Output(#[from] serde_json::Error),

    #[error("MCP stdio transport failed")]
    #[diagnostic(code(hrungnir::cli::stdio))]
    Stdio(#[source] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Specfile(#[from] SpecfileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),
}

pub type CliResult<T> = Result<T, CliError>;
