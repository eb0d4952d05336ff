//! Model validation and plan integrity errors.
//!
//! Both error types are raised at construction time. A value that made it
//! past its constructor (or past deserialization, which goes through the same
//! checks) is valid for the rest of its life.

use miette::Diagnostic;
use thiserror::Error;

/// Field-level constraint violations.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    #[diagnostic(code(hrungnir::models::out_of_range))]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown {kind}: '{value}'")]
    #[diagnostic(
        code(hrungnir::models::unknown_variant),
        help("Check the accepted values in the model documentation")
    )]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid {field}: lower bound {low} is greater than upper bound {high}")]
    #[diagnostic(code(hrungnir::models::invalid_interval))]
    InvalidInterval {
        field: &'static str,
        low: String,
        high: String,
    },

    #[error("{field} must not be empty")]
    #[diagnostic(code(hrungnir::models::empty_field))]
    Empty { field: &'static str },
}

/// Data-integrity errors in a chain build plan.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Package '{package}' appears in both group {first_group} and group {second_group}")]
    #[diagnostic(
        code(hrungnir::plan::duplicate_package),
        help("Every package must belong to exactly one build group")
    )]
    DuplicatePackage {
        package: String,
        first_group: u32,
        second_group: u32,
    },

    #[error("Group id {group_id} is used by more than one build group")]
    #[diagnostic(code(hrungnir::plan::duplicate_group))]
    DuplicateGroupId { group_id: u32 },

    #[error("Group {group_id} depends on '{package}', which is not part of the plan")]
    #[diagnostic(code(hrungnir::plan::unknown_dependency))]
    UnknownDependency { group_id: u32, package: String },

    #[error(
        "Group {group_id} depends on '{package}' from group {provided_by}, which is not ordered before it"
    )]
    #[diagnostic(
        code(hrungnir::plan::forward_dependency),
        help("Dependencies may only reference packages from earlier groups")
    )]
    ForwardDependency {
        group_id: u32,
        package: String,
        provided_by: u32,
    },

    #[error("Dependency cycle between packages: {}", packages.join(", "))]
    #[diagnostic(code(hrungnir::plan::dependency_cycle))]
    DependencyCycle { packages: Vec<String> },

    #[error("Invalid plan: {0}")]
    #[diagnostic(code(hrungnir::plan::invalid))]
    Invalid(#[from] ValidationError),
}
