//! Data models for packaging workflows.
//!
//! These are plain data containers describing packages, builds, chain build
//! plans and gating intelligence. Constraints (score ranges, enum tags, plan
//! integrity) are checked when a value is constructed or deserialized.

/// Declares a string-tagged enum with serde names, `Display`, `FromStr` and
/// an `ALL` table of variants.
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $tag)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire tag of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    _ => Err($crate::models::ValidationError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod build;
pub mod chain_build;
mod error;
pub mod gating;
pub mod package;
mod score;

#[cfg(test)]
mod build_test;
#[cfg(test)]
mod gating_test;

pub use build::{
    Architecture, BuildConfiguration, BuildEstimate, BuildResult, BuildStatus, BuildTarget,
    BuildType, GatingResult,
};
pub use chain_build::{
    BuildGroup, ChainBuildExecution, ChainBuildOptimization, ChainBuildPlan,
    ChainBuildPlanBuilder, ChainBuildStrategy, RiskLevel,
};
pub use error::{PlanError, ValidationError};
pub use gating::{
    BuildReadinessAssessment, ContentionLevel, GatingEnvironmentStatus, GatingFailurePrediction,
    GatingStage, GatingTestStatus, HistoricalGatingPattern, PackageGatingStatus,
    RecommendedAction, TestResult, TestType,
};
pub use package::{
    BuildRequirement, CentOsStreamTag, DependencyRelation, Package, PackageGraph, PackageInfo,
    PackageStatus,
};
pub use score::Score;
