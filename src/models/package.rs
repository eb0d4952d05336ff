//! Package-related data models and dependency graph queries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

tagged_enum! {
    #[derive(Default)]
    pub enum PackageStatus("package status") {
        #[default]
        Unknown => "unknown",
        Building => "building",
        Success => "success",
        Failed => "failed",
        Pending => "pending",
    }
}

tagged_enum! {
    /// CentOS Stream Koji tag a package currently sits in.
    pub enum CentOsStreamTag("CentOS Stream tag") {
        Gate => "gate",
        Candidate => "candidate",
        Pending => "pending",
        PendingSigned => "pending-signed",
        Build => "build",
        Released => "released",
    }
}

/// Basic package information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            release: None,
            epoch: None,
            summary: None,
            description: None,
        }
    }

    /// `name-[epoch:]version-release`, when version and release are known.
    pub fn nvr(&self) -> Option<String> {
        let version = self.version.as_deref()?;
        let release = self.release.as_deref()?;
        Some(match self.epoch.as_deref() {
            Some(epoch) if epoch != "0" => format!("{}-{}:{}-{}", self.name, epoch, version, release),
            _ => format!("{}-{}-{}", self.name, version, release),
        })
    }
}

/// A build or runtime requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequirement {
    pub name: String,
    /// Version specification, e.g. `>= 1.0`.
    #[serde(default)]
    pub version_spec: Option<String>,
    /// Conditional requirement expression.
    #[serde(default)]
    pub conditional: Option<String>,
}

/// A package in the packaging workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub info: PackageInfo,
    /// Source package name, for binary packages.
    #[serde(default)]
    pub source_package: Option<String>,
    #[serde(default)]
    pub build_requires: Vec<BuildRequirement>,
    #[serde(default)]
    pub requires: Vec<BuildRequirement>,

    #[serde(default)]
    pub current_tag: Option<CentOsStreamTag>,
    #[serde(default)]
    pub dist_git_url: Option<String>,
    #[serde(default)]
    pub spec_file_path: Option<String>,

    #[serde(default)]
    pub has_packit_config: bool,
    #[serde(default)]
    pub packit_job_types: Vec<String>,

    /// Last successful build timestamp.
    #[serde(default)]
    pub last_build_time: Option<String>,
    #[serde(default)]
    pub status: PackageStatus,
}

impl Package {
    pub fn new(info: PackageInfo) -> Self {
        Self {
            info,
            source_package: None,
            build_requires: Vec::new(),
            requires: Vec::new(),
            current_tag: None,
            dist_git_url: None,
            spec_file_path: None,
            has_packit_config: false,
            packit_job_types: Vec::new(),
            last_build_time: None,
            status: PackageStatus::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

fn default_depth() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// An edge `dependent -> dependency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRelation {
    pub dependent: String,
    pub dependency: String,
    /// `BuildRequires`, `Requires`, ...
    pub relation_type: String,
    #[serde(default = "default_true")]
    pub is_direct: bool,
    /// 1 = direct, 2+ = transitive.
    #[serde(default = "default_depth")]
    pub depth: u32,
}

impl DependencyRelation {
    /// Direct `BuildRequires` edge.
    pub fn build_requires(dependent: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            dependent: dependent.into(),
            dependency: dependency.into(),
            relation_type: "BuildRequires".to_string(),
            is_direct: true,
            depth: 1,
        }
    }

    fn within(&self, max_depth: Option<u32>) -> bool {
        max_depth.is_none_or(|max| self.depth <= max)
    }
}

/// Graph of package dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageGraph {
    /// Package name -> package.
    pub packages: BTreeMap<String, Package>,
    pub dependencies: Vec<DependencyRelation>,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, package: Package) {
        self.packages.insert(package.name().to_string(), package);
    }

    pub fn add_dependency(&mut self, relation: DependencyRelation) {
        self.dependencies.push(relation);
    }

    /// Packages depending on `package_name`, optionally limited to relations
    /// no deeper than `max_depth`. Sorted, no duplicates.
    pub fn dependents(&self, package_name: &str, max_depth: Option<u32>) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|rel| rel.dependency == package_name && rel.within(max_depth))
            .map(|rel| rel.dependent.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Packages `package_name` depends on, optionally limited to relations no
    /// deeper than `max_depth`. Sorted, no duplicates.
    pub fn dependencies_of(&self, package_name: &str, max_depth: Option<u32>) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|rel| rel.dependent == package_name && rel.within(max_depth))
            .map(|rel| rel.dependency.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
