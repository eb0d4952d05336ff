//! Gating intelligence data models.
//!
//! Pure data containers describing where packages sit in the CentOS Stream
//! gating pipeline and what is known about their history. Nothing in this
//! module computes predictions; the only behavior is constructor validation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RiskLevel, Score, ValidationError};

tagged_enum! {
    pub enum GatingStage("gating stage") {
        Gate => "c10s-gate",
        Candidate => "c10s-candidate",
        Pending => "c10s-pending",
        PendingSigned => "c10s-pending-signed",
        Build => "c10s-build",
        Released => "c10s-released",
    }
}

tagged_enum! {
    pub enum TestResult("test result") {
        Pending => "pending",
        Running => "running",
        Passed => "passed",
        Failed => "failed",
        Skipped => "skipped",
        Error => "error",
    }
}

tagged_enum! {
    pub enum TestType("test type") {
        RhelCi => "rhel_ci",
        CentosStreamCi => "centos_stream_ci",
        Integration => "integration",
        Beaker => "beaker",
        Tmt => "tmt",
    }
}

tagged_enum! {
    pub enum RecommendedAction("recommended action") {
        Proceed => "proceed",
        Wait => "wait",
        Modify => "modify",
        Abort => "abort",
    }
}

tagged_enum! {
    /// Resource contention in the gating infrastructure.
    #[derive(Default)]
    pub enum ContentionLevel("contention level") {
        Low => "low",
        #[default]
        Normal => "normal",
        High => "high",
        Critical => "critical",
    }
}

/// One test inside the gating pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingTestStatus {
    pub test_name: String,
    pub test_type: TestType,
    pub status: TestResult,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub log_url: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// Current gating status of one package build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageGatingStatus {
    pub package_name: String,
    /// Name-Version-Release.
    pub nvr: String,
    pub current_stage: GatingStage,
    pub stage_entered_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated_completion: Option<DateTime<Utc>>,

    #[serde(default)]
    pub rhel_ci_tests: Vec<GatingTestStatus>,
    #[serde(default)]
    pub centos_stream_tests: Vec<GatingTestStatus>,

    #[serde(default)]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub queue_depth: Option<u32>,

    /// NVRs blocking this package.
    #[serde(default)]
    pub blocked_by: Vec<String>,
    /// NVRs blocked by this package.
    #[serde(default)]
    pub blocking: Vec<String>,

    #[serde(default)]
    pub koji_build_url: Option<String>,
    #[serde(default)]
    pub gating_yaml_url: Option<String>,
    #[serde(default)]
    pub resultsdb_url: Option<String>,
}

impl PackageGatingStatus {
    /// Tests from both CI systems that ended in `failed` or `error`.
    pub fn failed_tests(&self) -> impl Iterator<Item = &GatingTestStatus> {
        self.rhel_ci_tests
            .iter()
            .chain(&self.centos_stream_tests)
            .filter(|t| matches!(t.status, TestResult::Failed | TestResult::Error))
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocked_by.is_empty()
    }
}

/// Historical gating behavior of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalGatingPattern {
    pub package_name: String,
    pub analysis_period_days: u32,

    pub total_builds: u32,
    pub gating_failures: u32,
    pub failure_rate: Score,

    pub average_gating_time_minutes: f64,
    pub p95_gating_time_minutes: f64,
    pub median_gating_time_minutes: f64,

    /// Failure reason -> count.
    #[serde(default)]
    pub common_failure_reasons: BTreeMap<String, u32>,
    /// Architecture -> failure rate.
    #[serde(default)]
    pub failure_by_architecture: BTreeMap<String, Score>,
    /// Hour of day -> failure rate.
    #[serde(default)]
    pub failure_by_time_of_day: BTreeMap<u8, Score>,
    /// Day of week -> failure rate.
    #[serde(default)]
    pub failure_by_day_of_week: BTreeMap<u8, Score>,

    /// Dependency package -> correlation score.
    #[serde(default)]
    pub dependency_failure_correlation: BTreeMap<String, f64>,

    #[serde(default)]
    pub average_maintainer_response_hours: Option<f64>,
}

impl HistoricalGatingPattern {
    /// Checks the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.gating_failures > self.total_builds {
            return Err(ValidationError::InvalidInterval {
                field: "gating_failures",
                low: self.gating_failures.to_string(),
                high: self.total_builds.to_string(),
            });
        }
        if let Some(hour) = self.failure_by_time_of_day.keys().find(|h| **h > 23) {
            return Err(ValidationError::OutOfRange {
                field: "failure_by_time_of_day",
                value: f64::from(*hour),
                min: 0.0,
                max: 23.0,
            });
        }
        if let Some(day) = self.failure_by_day_of_week.keys().find(|d| **d > 6) {
            return Err(ValidationError::OutOfRange {
                field: "failure_by_day_of_week",
                value: f64::from(*day),
                min: 0.0,
                max: 6.0,
            });
        }
        Ok(())
    }
}

/// Status of the gating infrastructure at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingEnvironmentStatus {
    pub timestamp: DateTime<Utc>,
    pub rhel_ci_operational: bool,
    pub centos_stream_ci_operational: bool,
    #[serde(default)]
    pub known_issues: Vec<String>,
    #[serde(default)]
    pub estimated_delay_minutes: Option<u32>,
    #[serde(default)]
    pub resource_contention_level: ContentionLevel,

    #[serde(default)]
    pub total_packages_in_gating: u32,
    #[serde(default)]
    pub average_queue_time_minutes: f64,

    #[serde(default)]
    pub rhel_ci_queue_depth: u32,
    #[serde(default)]
    pub centos_stream_ci_queue_depth: u32,
}

impl GatingEnvironmentStatus {
    pub fn is_fully_operational(&self) -> bool {
        self.rhel_ci_operational && self.centos_stream_ci_operational
    }
}

fn default_true() -> bool {
    true
}

/// Build readiness assessment enriched with gating intelligence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReadinessAssessment {
    pub package_name: String,
    pub target_branch: String,
    pub assessment_timestamp: DateTime<Utc>,

    /// 0 = low risk, 1 = high risk.
    pub overall_risk_score: Score,
    pub risk_level: RiskLevel,
    pub recommended_action: RecommendedAction,
    pub confidence_score: Score,

    pub spec_file_valid: bool,
    pub dependencies_available: bool,
    pub build_target_compatible: bool,
    pub source_accessible: bool,
    #[serde(default = "default_true")]
    pub packit_config_valid: bool,

    #[serde(default)]
    pub current_gating_status: Option<PackageGatingStatus>,
    #[serde(default)]
    pub historical_patterns: Option<HistoricalGatingPattern>,
    #[serde(default)]
    pub environment_status: Option<GatingEnvironmentStatus>,

    #[serde(default)]
    pub dependency_gating_risks: Vec<String>,
    #[serde(default)]
    pub conflicting_builds: Vec<String>,
    #[serde(default)]
    pub resource_conflicts: Vec<String>,

    #[serde(default)]
    pub identified_risks: Vec<String>,
    #[serde(default)]
    pub mitigation_suggestions: Vec<String>,
    #[serde(default)]
    pub blocking_issues: Vec<String>,

    #[serde(default)]
    pub alternative_build_targets: Vec<String>,
    #[serde(default)]
    pub suggested_wait_time_minutes: Option<u32>,
    #[serde(default)]
    pub draft_build_eligible: bool,
    #[serde(default)]
    pub optimal_build_timing: Option<DateTime<Utc>>,
}

impl BuildReadinessAssessment {
    /// True when every core validation passed and nothing blocks the build.
    pub fn is_ready(&self) -> bool {
        self.spec_file_valid
            && self.dependencies_available
            && self.build_target_compatible
            && self.source_accessible
            && self.packit_config_valid
            && self.blocking_issues.is_empty()
    }
}

/// Predicted likelihood of a gating failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingFailurePrediction {
    pub package_name: String,
    pub prediction_timestamp: DateTime<Utc>,

    pub failure_probability: Score,
    /// 95% confidence interval.
    pub confidence_interval: (Score, Score),
    pub model_confidence: Score,

    /// Risk factor -> impact.
    #[serde(default)]
    pub risk_factors: BTreeMap<String, f64>,
    /// Protective factor -> impact.
    #[serde(default)]
    pub protective_factors: BTreeMap<String, f64>,
    /// Dependency -> risk propagation.
    #[serde(default)]
    pub dependency_risk_propagation: BTreeMap<String, f64>,

    #[serde(default)]
    pub optimal_submission_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    #[serde(default)]
    pub peak_risk_periods: Vec<(DateTime<Utc>, DateTime<Utc>)>,

    pub model_version: String,
    pub training_data_period: (DateTime<Utc>, DateTime<Utc>),
    /// Feature -> importance.
    #[serde(default)]
    pub feature_importance: BTreeMap<String, f64>,
}

impl GatingFailurePrediction {
    /// Checks interval ordering and that the point estimate lies inside its
    /// confidence interval.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (low, high) = self.confidence_interval;
        if low > high {
            return Err(ValidationError::InvalidInterval {
                field: "confidence_interval",
                low: low.to_string(),
                high: high.to_string(),
            });
        }
        if self.failure_probability < low || self.failure_probability > high {
            return Err(ValidationError::OutOfRange {
                field: "failure_probability",
                value: self.failure_probability.value(),
                min: low.value(),
                max: high.value(),
            });
        }
        check_window("optimal_submission_window", self.optimal_submission_window.as_ref())?;
        for window in &self.peak_risk_periods {
            check_window("peak_risk_periods", Some(window))?;
        }
        check_window("training_data_period", Some(&self.training_data_period))
    }
}

fn check_window(
    field: &'static str,
    window: Option<&(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<(), ValidationError> {
    match window {
        Some((start, end)) if end < start => Err(ValidationError::InvalidInterval {
            field,
            low: start.to_rfc3339(),
            high: end.to_rfc3339(),
        }),
        _ => Ok(()),
    }
}
