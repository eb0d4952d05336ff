//! Tests for build models.

use chrono::{Duration, TimeZone, Utc};

use crate::models::{
    Architecture, BuildConfiguration, BuildEstimate, BuildResult, BuildStatus, BuildTarget,
    BuildType, Score, ValidationError,
};

#[test]
fn build_target_tags_match_koji_names() {
    let target: BuildTarget = serde_json::from_str("\"c10s-candidate-pesign\"").unwrap();
    assert_eq!(target, BuildTarget::C10sCandidatePesign);
    assert_eq!(
        "java-openjdk-rhel-9-build".parse::<BuildTarget>().unwrap(),
        BuildTarget::JavaOpenjdkRhel9Build
    );
    assert_eq!(BuildTarget::C9sBuild.to_string(), "c9s-build");
}

#[test]
fn unknown_tag_is_rejected() {
    let err = "c8s-build".parse::<BuildTarget>().unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnknownVariant {
            kind: "build target",
            value: "c8s-build".to_string(),
        }
    );
    assert!(serde_json::from_str::<BuildStatus>("\"done\"").is_err());
}

#[test]
fn every_status_parses_from_its_tag() {
    for status in BuildStatus::ALL {
        assert_eq!(status.as_str().parse::<BuildStatus>().unwrap(), *status);
    }
}

#[test]
fn terminal_statuses() {
    assert!(BuildStatus::Success.is_terminal());
    assert!(BuildStatus::Failed.is_terminal());
    assert!(BuildStatus::Canceled.is_terminal());
    assert!(!BuildStatus::Pending.is_terminal());
    assert!(!BuildStatus::Running.is_terminal());
    assert!(!BuildStatus::Skipped.is_terminal());
}

#[test]
fn configuration_defaults() {
    let config: BuildConfiguration = serde_json::from_str(r#"{"target": "c10s-build"}"#).unwrap();
    assert_eq!(config, BuildConfiguration::new(BuildTarget::C10sBuild));
    assert_eq!(
        config.architectures,
        vec![Architecture::X86_64, Architecture::I686]
    );
    assert_eq!(config.build_type, BuildType::Official);
    assert!(!config.scratch);
}

#[test]
fn result_timing_derives_duration() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    let end = start + Duration::minutes(42);
    let result = BuildResult::new(
        "bash",
        BuildStatus::Success,
        BuildConfiguration::new(BuildTarget::C10sBuild),
    )
    .with_timing(start, end)
    .unwrap();

    assert!(result.is_success());
    assert_eq!(result.duration_seconds, Some(42 * 60));
    assert_eq!(result.end_time, Some(end));
}

#[test]
fn result_timing_rejects_end_before_start() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    let result = BuildResult::new(
        "bash",
        BuildStatus::Failed,
        BuildConfiguration::new(BuildTarget::C10sBuild),
    )
    .with_timing(start, start - Duration::seconds(1));

    assert!(matches!(
        result,
        Err(ValidationError::InvalidInterval { .. })
    ));
}

#[test]
fn estimate_confidence_is_validated() {
    let estimate = BuildEstimate::new("kernel", 240);
    assert_eq!(estimate.confidence_score.value(), 0.7);

    let estimate = estimate.with_confidence(0.95).unwrap();
    assert_eq!(estimate.confidence_score, Score::new(0.95).unwrap());

    let err = BuildEstimate::new("kernel", 240)
        .with_confidence(1.5)
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::OutOfRange {
            field: "confidence_score",
            ..
        }
    ));
}

#[test]
fn estimate_deserialization_checks_confidence() {
    let estimate: BuildEstimate =
        serde_json::from_str(r#"{"package_name": "gcc", "estimated_duration_minutes": 90}"#)
            .unwrap();
    assert_eq!(estimate.confidence_score.value(), 0.7);
    assert_eq!(estimate.total_minutes(), 90);

    let bad = serde_json::from_str::<BuildEstimate>(
        r#"{"package_name": "gcc", "estimated_duration_minutes": 90, "confidence_score": -0.1}"#,
    );
    assert!(bad.is_err());
}

#[test]
fn score_bounds() {
    assert!(Score::new(0.0).is_ok());
    assert!(Score::new(1.0).is_ok());
    assert!(Score::new(1.0001).is_err());
    assert!(Score::new(f64::NAN).is_err());
    assert_eq!(Score::ONE.to_string(), "1.00");
}
