//! Build-related data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Score, ValidationError};

tagged_enum! {
    /// Kind of build submitted to the build system.
    #[derive(Default)]
    pub enum BuildType("build type") {
        Scratch => "scratch",
        Draft => "draft",
        #[default]
        Official => "official",
        Chain => "chain",
    }
}

tagged_enum! {
    /// Status of a single build or of a whole chain build execution.
    #[derive(Default)]
    pub enum BuildStatus("build status") {
        #[default]
        Pending => "pending",
        Running => "running",
        Success => "success",
        Failed => "failed",
        Canceled => "canceled",
        Skipped => "skipped",
    }
}

impl BuildStatus {
    /// Whether an execution in this status will not change any more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildStatus::Success | BuildStatus::Failed | BuildStatus::Canceled
        )
    }
}

tagged_enum! {
    /// Koji build target.
    pub enum BuildTarget("build target") {
        C10sCandidate => "c10s-candidate",
        C10sPending => "c10s-pending",
        C10sBuild => "c10s-build",
        C9sCandidate => "c9s-candidate",
        C9sPending => "c9s-pending",
        C9sBuild => "c9s-build",
        /// Kernel builds (signed with pesign).
        C10sCandidatePesign => "c10s-candidate-pesign",
        /// Java builds.
        JavaOpenjdkRhel9Build => "java-openjdk-rhel-9-build",
    }
}

tagged_enum! {
    pub enum Architecture("architecture") {
        X86_64 => "x86_64",
        Aarch64 => "aarch64",
        Ppc64le => "ppc64le",
        S390x => "s390x",
        I686 => "i686",
        Noarch => "noarch",
    }
}

fn default_architectures() -> Vec<Architecture> {
    vec![Architecture::X86_64, Architecture::I686]
}

/// Build configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub target: BuildTarget,
    #[serde(default = "default_architectures")]
    pub architectures: Vec<Architecture>,
    #[serde(default)]
    pub build_type: BuildType,
    #[serde(default)]
    pub scratch: bool,
    /// Timeout in minutes.
    #[serde(default)]
    pub timeout: Option<u32>,

    // RoG pipeline
    #[serde(default)]
    pub enable_draft_builds: bool,
    #[serde(default)]
    pub enable_konflux: bool,
    /// Signing required (e.g. kernel).
    #[serde(default)]
    pub signing_required: bool,

    #[serde(default)]
    pub additional_repos: Vec<String>,
    #[serde(default)]
    pub additional_packages: Vec<String>,
}

impl BuildConfiguration {
    /// Official build for `target` on the default architectures.
    pub fn new(target: BuildTarget) -> Self {
        Self {
            target,
            architectures: default_architectures(),
            build_type: BuildType::default(),
            scratch: false,
            timeout: None,
            enable_draft_builds: false,
            enable_konflux: false,
            signing_required: false,
            additional_repos: Vec::new(),
            additional_packages: Vec::new(),
        }
    }
}

/// Result of a build operation.
///
/// Only `status` is interpreted by the chain build tracker; everything else is
/// payload carried for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    #[serde(default)]
    pub build_id: Option<u64>,
    pub package_name: String,
    pub status: BuildStatus,
    pub config: BuildConfiguration,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,

    /// Built artifacts (RPMs, logs, ...).
    #[serde(default)]
    pub artifacts: Vec<String>,
    #[serde(default)]
    pub log_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub koji_task_id: Option<u64>,
    #[serde(default)]
    pub copr_build_id: Option<u64>,
    #[serde(default)]
    pub rog_pipeline_id: Option<String>,
}

impl BuildResult {
    pub fn new(
        package_name: impl Into<String>,
        status: BuildStatus,
        config: BuildConfiguration,
    ) -> Self {
        Self {
            build_id: None,
            package_name: package_name.into(),
            status,
            config,
            start_time: None,
            end_time: None,
            duration_seconds: None,
            artifacts: Vec::new(),
            log_url: None,
            error_message: None,
            koji_task_id: None,
            copr_build_id: None,
            rog_pipeline_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Success
    }

    /// Sets both timestamps and derives `duration_seconds` from them.
    pub fn with_timing(
        mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidInterval {
                field: "build timing",
                low: start.to_rfc3339(),
                high: end.to_rfc3339(),
            });
        }
        self.duration_seconds = Some((end - start).num_seconds().unsigned_abs());
        self.start_time = Some(start);
        self.end_time = Some(end);
        Ok(self)
    }
}

fn default_estimate_confidence() -> Score {
    Score(0.7)
}

/// Estimated build time and resource requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildEstimate {
    pub package_name: String,
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub estimated_queue_time_minutes: u32,

    /// Large packages (kernel, systemd, ...).
    #[serde(default)]
    pub is_large_package: bool,
    #[serde(default)]
    pub requires_signing: bool,
    #[serde(default)]
    pub is_java_package: bool,
    #[serde(default)]
    pub has_konflux_integration: bool,

    #[serde(default)]
    pub memory_gb: Option<u32>,
    #[serde(default)]
    pub disk_gb: Option<u32>,
    #[serde(default)]
    pub cpu_cores: Option<u32>,

    #[serde(default = "default_estimate_confidence")]
    pub confidence_score: Score,
}

impl BuildEstimate {
    pub fn new(package_name: impl Into<String>, estimated_duration_minutes: u32) -> Self {
        Self {
            package_name: package_name.into(),
            estimated_duration_minutes,
            estimated_queue_time_minutes: 0,
            is_large_package: false,
            requires_signing: false,
            is_java_package: false,
            has_konflux_integration: false,
            memory_gb: None,
            disk_gb: None,
            cpu_cores: None,
            confidence_score: default_estimate_confidence(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Result<Self, ValidationError> {
        self.confidence_score = Score::for_field("confidence_score", confidence)?;
        Ok(self)
    }

    /// Build plus queue time.
    pub fn total_minutes(&self) -> u32 {
        self.estimated_duration_minutes
            .saturating_add(self.estimated_queue_time_minutes)
    }
}

/// Gating test results for one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingResult {
    pub package_name: String,
    pub build_id: u64,
    pub overall_status: BuildStatus,

    /// Test name -> result.
    #[serde(default)]
    pub test_results: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub gating_yaml_url: Option<String>,
    #[serde(default)]
    pub resultsdb_url: Option<String>,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub known_issues: Vec<String>,
}
