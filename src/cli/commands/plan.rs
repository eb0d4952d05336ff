//! Offline chain build plan commands

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::json;
use tabled::{Table, Tabled};
use tracing::debug;

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{OutputFormat, apply_table_style, format_list, truncate_with_ellipsis};
use crate::models::{BuildGroup, ChainBuildPlan};

#[derive(Tabled)]
pub(crate) struct GroupDisplay {
    #[tabled(rename = "Group")]
    pub(crate) group_id: u32,
    #[tabled(rename = "Packages")]
    pub(crate) packages: String,
    #[tabled(rename = "Waits For")]
    pub(crate) dependencies: String,
    #[tabled(rename = "Est. (min)")]
    pub(crate) estimated_minutes: u32,
    #[tabled(rename = "Risk")]
    pub(crate) risk: String,
}

impl From<&BuildGroup> for GroupDisplay {
    fn from(group: &BuildGroup) -> Self {
        Self {
            group_id: group.group_id,
            packages: truncate_with_ellipsis(&format_list(&group.packages), 60),
            dependencies: truncate_with_ellipsis(&format_list(&group.dependencies_satisfied), 40),
            estimated_minutes: group.estimated_duration_minutes,
            risk: group.risk_level.to_string(),
        }
    }
}

#[derive(Tabled)]
pub(crate) struct ReadyDisplay {
    #[tabled(rename = "Package")]
    pub(crate) package: String,
    #[tabled(rename = "Group")]
    pub(crate) group_id: String,
}

/// Load a plan document, choosing the parser by file extension.
///
/// Structural checks run during deserialization, so an inconsistent plan is
/// reported as [`CliError::InvalidPlan`].
pub fn load_plan(path: &Path) -> CliResult<ChainBuildPlan> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let content = || {
        std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
    };
    let invalid = |message: String| CliError::InvalidPlan {
        path: path.to_path_buf(),
        message,
    };

    let plan = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content()?).map_err(|e| invalid(e.to_string()))?,
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content()?).map_err(|e| invalid(e.to_string()))?
        }
        _ => {
            return Err(CliError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    debug!("Loaded plan from {}", path.display());
    Ok(plan)
}

/// Validate a plan file and summarise it
pub fn validate(path: &Path, format: OutputFormat) -> CliResult<String> {
    let plan = load_plan(path)?;

    match format {
        OutputFormat::Json => {
            let summary = json!({
                "valid": true,
                "plan_id": plan.plan_id(),
                "target_tag": plan.target_tag(),
                "strategy": plan.strategy(),
                "total_packages": plan.total_packages(),
                "build_groups": plan.build_groups().len(),
                "estimated_total_duration_minutes": plan.estimated_total_duration_minutes(),
                "overall_risk_level": plan.overall_risk_level(),
                "critical_path_packages": plan.critical_path_packages(),
                "estimated_completion_time": plan.estimated_completion_time(),
            });
            Ok(serde_json::to_string_pretty(&summary)?)
        }
        OutputFormat::Table => {
            let rows: Vec<GroupDisplay> = plan.build_groups().iter().map(Into::into).collect();
            let mut table = Table::new(rows);
            apply_table_style(&mut table);

            Ok(format!(
                "Plan '{}' for {} is valid: {} packages in {} groups, ~{} min, {} risk\n{}",
                plan.plan_id(),
                plan.target_tag(),
                plan.total_packages(),
                plan.build_groups().len(),
                plan.estimated_total_duration_minutes(),
                plan.overall_risk_level(),
                table
            ))
        }
    }
}

/// Packages that could start once `completed` have been built
pub fn ready(path: &Path, completed: &[String], format: OutputFormat) -> CliResult<String> {
    let plan = load_plan(path)?;
    let completed: BTreeSet<String> = completed
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let ready = plan.ready_packages(&completed);
    let unknown: Vec<&String> = completed
        .iter()
        .filter(|name| !plan.contains_package(name))
        .collect();

    match format {
        OutputFormat::Json => {
            let output = json!({
                "plan_id": plan.plan_id(),
                "ready_packages": ready,
                "completed_packages": completed,
                "unknown_packages": unknown,
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
        OutputFormat::Table => {
            let mut output = String::new();
            if !unknown.is_empty() {
                output.push_str(&format!(
                    "Ignoring packages not in plan: {}\n",
                    format_list(&unknown)
                ));
            }

            if ready.is_empty() {
                let done = plan.packages().all(|package| completed.contains(package));
                output.push_str(if done {
                    "All packages in the plan are completed."
                } else {
                    "No packages are ready."
                });
                return Ok(output);
            }

            let rows: Vec<ReadyDisplay> = ready
                .iter()
                .map(|package| ReadyDisplay {
                    package: package.clone(),
                    group_id: plan
                        .group_for(package)
                        .map(|group| group.group_id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            let mut table = Table::new(rows);
            apply_table_style(&mut table);
            output.push_str(&table.to_string());
            Ok(output)
        }
    }
}
