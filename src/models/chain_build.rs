//! Chain build planning and execution models.
//!
//! A [`ChainBuildPlan`] is an ordered list of [`BuildGroup`] waves. Plans are
//! immutable once built and can only be obtained through
//! [`ChainBuildPlanBuilder::build`], which checks the structural invariants:
//!
//! - group ids are unique,
//! - every package belongs to exactly one group,
//! - a group only depends on packages of groups ordered before it.
//!
//! Deserializing a plan goes through the same builder.
//!
//! A [`ChainBuildExecution`] is the mutable tracking state for one run of a
//! plan. Its state transitions live in [`crate::services::chain_build`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BuildConfiguration, BuildResult, BuildStatus, PlanError, ValidationError};

tagged_enum! {
    #[derive(Default)]
    pub enum ChainBuildStrategy("chain build strategy") {
        /// One package at a time.
        Sequential => "sequential",
        /// Independent packages of a wave in parallel.
        #[default]
        ParallelGroups => "parallel_groups",
        /// Maximum parallelization.
        AggressiveParallel => "aggressive_parallel",
        /// Extra validation between waves.
        Conservative => "conservative",
    }
}

tagged_enum! {
    #[derive(Default, PartialOrd, Ord)]
    pub enum RiskLevel("risk level") {
        #[default]
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

fn default_true() -> bool {
    true
}

/// A wave of packages that may build together once its prerequisites are done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildGroup {
    /// Sequence number; unique within a plan, not necessarily contiguous.
    pub group_id: u32,
    /// Display order only.
    pub packages: Vec<String>,
    /// Packages that must all be completed before this group may start.
    #[serde(default)]
    pub dependencies_satisfied: BTreeSet<String>,
    #[serde(default)]
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub risk_level: RiskLevel,

    #[serde(default = "default_true")]
    pub can_run_in_parallel: bool,
    #[serde(default)]
    pub max_parallel_jobs: Option<u32>,

    #[serde(default)]
    pub requires_special_target: bool,
    #[serde(default)]
    pub signing_required: bool,
}

impl BuildGroup {
    pub fn new<I, S>(group_id: u32, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_id,
            packages: packages.into_iter().map(Into::into).collect(),
            dependencies_satisfied: BTreeSet::new(),
            estimated_duration_minutes: 0,
            risk_level: RiskLevel::default(),
            can_run_in_parallel: true,
            max_parallel_jobs: None,
            requires_special_target: false,
            signing_required: false,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies_satisfied = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = minutes;
        self
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_max_parallel_jobs(mut self, jobs: u32) -> Self {
        self.max_parallel_jobs = Some(jobs);
        self
    }

    pub fn contains(&self, package_name: &str) -> bool {
        self.packages.iter().any(|p| p == package_name)
    }

    /// Whether every prerequisite of this group is in `completed`.
    pub fn is_unblocked_by(&self, completed: &BTreeSet<String>) -> bool {
        self.dependencies_satisfied.is_subset(completed)
    }
}

/// Complete, validated plan for executing a chain build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChainBuildPlanBuilder")]
pub struct ChainBuildPlan {
    plan_id: String,
    root_packages: Vec<String>,
    target_tag: String,

    strategy: ChainBuildStrategy,
    build_groups: Vec<BuildGroup>,

    estimated_total_duration_minutes: u32,
    estimated_queue_time_minutes: u32,
    critical_path_packages: Vec<String>,

    overall_risk_level: RiskLevel,
    risk_factors: Vec<String>,

    packit_automation_packages: Vec<String>,
    rog_pipeline_coordination: bool,
    konflux_packages: Vec<String>,

    default_build_config: Option<BuildConfiguration>,
    package_specific_configs: BTreeMap<String, BuildConfiguration>,

    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl ChainBuildPlan {
    pub fn builder(
        plan_id: impl Into<String>,
        target_tag: impl Into<String>,
    ) -> ChainBuildPlanBuilder {
        ChainBuildPlanBuilder::new(plan_id, target_tag)
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn root_packages(&self) -> &[String] {
        &self.root_packages
    }

    /// Target build tag, e.g. `c10s-build`.
    pub fn target_tag(&self) -> &str {
        &self.target_tag
    }

    pub fn strategy(&self) -> ChainBuildStrategy {
        self.strategy
    }

    /// Groups in execution order.
    pub fn build_groups(&self) -> &[BuildGroup] {
        &self.build_groups
    }

    pub fn estimated_total_duration_minutes(&self) -> u32 {
        self.estimated_total_duration_minutes
    }

    pub fn estimated_queue_time_minutes(&self) -> u32 {
        self.estimated_queue_time_minutes
    }

    pub fn critical_path_packages(&self) -> &[String] {
        &self.critical_path_packages
    }

    pub fn overall_risk_level(&self) -> RiskLevel {
        self.overall_risk_level
    }

    pub fn risk_factors(&self) -> &[String] {
        &self.risk_factors
    }

    pub fn packit_automation_packages(&self) -> &[String] {
        &self.packit_automation_packages
    }

    pub fn rog_pipeline_coordination(&self) -> bool {
        self.rog_pipeline_coordination
    }

    pub fn konflux_packages(&self) -> &[String] {
        &self.konflux_packages
    }

    pub fn default_build_config(&self) -> Option<&BuildConfiguration> {
        self.default_build_config.as_ref()
    }

    pub fn package_specific_configs(&self) -> &BTreeMap<String, BuildConfiguration> {
        &self.package_specific_configs
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// Sum of group sizes.
    pub fn total_packages(&self) -> usize {
        self.build_groups.iter().map(|g| g.packages.len()).sum()
    }

    pub fn estimated_completion_time(&self) -> DateTime<Utc> {
        self.created_at + Duration::minutes(i64::from(self.estimated_total_duration_minutes))
    }

    /// All packages of the plan in group order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.build_groups
            .iter()
            .flat_map(|g| g.packages.iter().map(String::as_str))
    }

    pub fn contains_package(&self, package_name: &str) -> bool {
        self.build_groups.iter().any(|g| g.contains(package_name))
    }

    /// Package-specific configuration, falling back to the plan default.
    pub fn build_config_for(&self, package_name: &str) -> Option<&BuildConfiguration> {
        self.package_specific_configs
            .get(package_name)
            .or(self.default_build_config.as_ref())
    }
}

/// Unvalidated plan under construction.
///
/// Also the serde representation of a plan: every optional field has a
/// default, so a document only needs `plan_id`, `target_tag` and
/// `build_groups`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainBuildPlanBuilder {
    plan_id: String,
    target_tag: String,
    #[serde(default)]
    root_packages: Vec<String>,
    #[serde(default)]
    strategy: ChainBuildStrategy,
    #[serde(default)]
    build_groups: Vec<BuildGroup>,
    /// Defaults to the sum of the group estimates.
    #[serde(default)]
    estimated_total_duration_minutes: Option<u32>,
    #[serde(default)]
    estimated_queue_time_minutes: u32,
    #[serde(default)]
    critical_path_packages: Vec<String>,
    /// Defaults to the highest group risk.
    #[serde(default)]
    overall_risk_level: Option<RiskLevel>,
    #[serde(default)]
    risk_factors: Vec<String>,
    #[serde(default)]
    packit_automation_packages: Vec<String>,
    #[serde(default)]
    rog_pipeline_coordination: bool,
    #[serde(default)]
    konflux_packages: Vec<String>,
    #[serde(default)]
    default_build_config: Option<BuildConfiguration>,
    #[serde(default)]
    package_specific_configs: BTreeMap<String, BuildConfiguration>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_by: Option<String>,
}

impl ChainBuildPlanBuilder {
    pub fn new(plan_id: impl Into<String>, target_tag: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            target_tag: target_tag.into(),
            root_packages: Vec::new(),
            strategy: ChainBuildStrategy::default(),
            build_groups: Vec::new(),
            estimated_total_duration_minutes: None,
            estimated_queue_time_minutes: 0,
            critical_path_packages: Vec::new(),
            overall_risk_level: None,
            risk_factors: Vec::new(),
            packit_automation_packages: Vec::new(),
            rog_pipeline_coordination: false,
            konflux_packages: Vec::new(),
            default_build_config: None,
            package_specific_configs: BTreeMap::new(),
            created_at: None,
            created_by: None,
        }
    }

    pub fn root_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn strategy(mut self, strategy: ChainBuildStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Appends a group; groups execute in the order they are added.
    pub fn group(mut self, group: BuildGroup) -> Self {
        self.build_groups.push(group);
        self
    }

    pub fn groups(mut self, groups: impl IntoIterator<Item = BuildGroup>) -> Self {
        self.build_groups.extend(groups);
        self
    }

    pub fn estimated_total_duration_minutes(mut self, minutes: u32) -> Self {
        self.estimated_total_duration_minutes = Some(minutes);
        self
    }

    pub fn estimated_queue_time_minutes(mut self, minutes: u32) -> Self {
        self.estimated_queue_time_minutes = minutes;
        self
    }

    pub fn critical_path_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_path_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn overall_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.overall_risk_level = Some(risk_level);
        self
    }

    pub fn risk_factor(mut self, factor: impl Into<String>) -> Self {
        self.risk_factors.push(factor.into());
        self
    }

    pub fn packit_automation_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packit_automation_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn rog_pipeline_coordination(mut self, enabled: bool) -> Self {
        self.rog_pipeline_coordination = enabled;
        self
    }

    pub fn konflux_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.konflux_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_build_config(mut self, config: BuildConfiguration) -> Self {
        self.default_build_config = Some(config);
        self
    }

    pub fn package_config(
        mut self,
        package_name: impl Into<String>,
        config: BuildConfiguration,
    ) -> Self {
        self.package_specific_configs
            .insert(package_name.into(), config);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Validates the plan structure and freezes it.
    pub fn build(self) -> Result<ChainBuildPlan, PlanError> {
        if self.plan_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "plan_id" }.into());
        }
        if self.target_tag.trim().is_empty() {
            return Err(ValidationError::Empty { field: "target_tag" }.into());
        }

        validate_groups(&self.build_groups)?;

        let estimated_total_duration_minutes =
            self.estimated_total_duration_minutes.unwrap_or_else(|| {
                self.build_groups
                    .iter()
                    .map(|g| g.estimated_duration_minutes)
                    .fold(0u32, u32::saturating_add)
            });
        let overall_risk_level = self.overall_risk_level.unwrap_or_else(|| {
            self.build_groups
                .iter()
                .map(|g| g.risk_level)
                .max()
                .unwrap_or_default()
        });

        Ok(ChainBuildPlan {
            plan_id: self.plan_id,
            root_packages: self.root_packages,
            target_tag: self.target_tag,
            strategy: self.strategy,
            build_groups: self.build_groups,
            estimated_total_duration_minutes,
            estimated_queue_time_minutes: self.estimated_queue_time_minutes,
            critical_path_packages: self.critical_path_packages,
            overall_risk_level,
            risk_factors: self.risk_factors,
            packit_automation_packages: self.packit_automation_packages,
            rog_pipeline_coordination: self.rog_pipeline_coordination,
            konflux_packages: self.konflux_packages,
            default_build_config: self.default_build_config,
            package_specific_configs: self.package_specific_configs,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            created_by: self.created_by,
        })
    }
}

impl TryFrom<ChainBuildPlanBuilder> for ChainBuildPlan {
    type Error = PlanError;

    fn try_from(builder: ChainBuildPlanBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn validate_groups(groups: &[BuildGroup]) -> Result<(), PlanError> {
    let mut group_ids = HashSet::new();
    let mut owner: HashMap<&str, u32> = HashMap::new();

    for group in groups {
        if !group_ids.insert(group.group_id) {
            return Err(PlanError::DuplicateGroupId {
                group_id: group.group_id,
            });
        }
        for package in &group.packages {
            if let Some(first_group) = owner.insert(package, group.group_id) {
                return Err(PlanError::DuplicatePackage {
                    package: package.clone(),
                    first_group,
                    second_group: group.group_id,
                });
            }
        }
    }

    let mut earlier: HashSet<&str> = HashSet::new();
    for group in groups {
        for dependency in &group.dependencies_satisfied {
            if earlier.contains(dependency.as_str()) {
                continue;
            }
            return Err(match owner.get(dependency.as_str()) {
                Some(provided_by) => PlanError::ForwardDependency {
                    group_id: group.group_id,
                    package: dependency.clone(),
                    provided_by: *provided_by,
                },
                None => PlanError::UnknownDependency {
                    group_id: group.group_id,
                    package: dependency.clone(),
                },
            });
        }
        earlier.extend(group.packages.iter().map(String::as_str));
    }

    Ok(())
}

/// Tracking state for one execution of a plan.
///
/// The three package sets are pairwise disjoint. They are only changed by the
/// transition methods in [`crate::services::chain_build`].
#[derive(Debug, Clone, Serialize)]
pub struct ChainBuildExecution {
    pub(crate) execution_id: String,
    pub(crate) plan: Arc<ChainBuildPlan>,

    pub(crate) current_status: BuildStatus,
    pub(crate) completed_packages: BTreeSet<String>,
    pub(crate) failed_packages: BTreeSet<String>,
    pub(crate) running_packages: BTreeSet<String>,

    pub(crate) build_results: BTreeMap<String, BuildResult>,

    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,

    pub(crate) error_message: Option<String>,
    pub(crate) retry_count: u32,
}

impl ChainBuildExecution {
    /// New execution in `pending` status.
    pub fn new(execution_id: impl Into<String>, plan: Arc<ChainBuildPlan>) -> Self {
        Self {
            execution_id: execution_id.into(),
            plan,
            current_status: BuildStatus::Pending,
            completed_packages: BTreeSet::new(),
            failed_packages: BTreeSet::new(),
            running_packages: BTreeSet::new(),
            build_results: BTreeMap::new(),
            started_at: None,
            completed_at: None,
            error_message: None,
            retry_count: 0,
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn plan(&self) -> &ChainBuildPlan {
        &self.plan
    }

    pub fn current_status(&self) -> BuildStatus {
        self.current_status
    }

    pub fn completed_packages(&self) -> &BTreeSet<String> {
        &self.completed_packages
    }

    pub fn failed_packages(&self) -> &BTreeSet<String> {
        &self.failed_packages
    }

    pub fn running_packages(&self) -> &BTreeSet<String> {
        &self.running_packages
    }

    pub fn build_results(&self) -> &BTreeMap<String, BuildResult> {
        &self.build_results
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Share of packages with a terminal outcome, in percent.
    pub fn progress_percentage(&self) -> f64 {
        let total = self.plan.total_packages();
        if total == 0 {
            return 0.0;
        }
        let finished = self.completed_packages.len() + self.failed_packages.len();
        finished as f64 / total as f64 * 100.0
    }

    /// Whether the execution reached `success`, `failed` or `canceled`.
    pub fn is_complete(&self) -> bool {
        self.current_status.is_terminal()
    }
}

/// Optimization suggestions for a chain build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBuildOptimization {
    pub suggested_strategy: ChainBuildStrategy,
    pub bottleneck_packages: Vec<String>,
    pub optimization_suggestions: Vec<String>,

    /// Maximum safe parallelism level.
    pub max_parallelism: u32,
    /// Time saved by building groups in parallel.
    pub parallel_groups_savings_minutes: u32,

    pub high_risk_packages: Vec<String>,
    pub mitigation_strategies: Vec<String>,

    #[serde(default)]
    pub alternative_orders: Vec<Vec<String>>,
    #[serde(default)]
    pub incremental_build_candidates: Vec<String>,
}
