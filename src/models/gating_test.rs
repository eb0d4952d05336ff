//! Tests for gating models.

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use crate::models::{
    BuildReadinessAssessment, GatingEnvironmentStatus, GatingFailurePrediction, GatingStage,
    GatingTestStatus, HistoricalGatingPattern, PackageGatingStatus, RecommendedAction, RiskLevel,
    Score, TestResult, TestType, ValidationError,
};

fn test_status(name: &str, status: TestResult) -> GatingTestStatus {
    GatingTestStatus {
        test_name: name.to_string(),
        test_type: TestType::Tmt,
        status,
        started_at: None,
        completed_at: None,
        failure_reason: None,
        log_url: None,
        architecture: None,
        duration_minutes: None,
    }
}

fn pattern() -> HistoricalGatingPattern {
    HistoricalGatingPattern {
        package_name: "systemd".to_string(),
        analysis_period_days: 30,
        total_builds: 20,
        gating_failures: 3,
        failure_rate: Score::new(0.15).unwrap(),
        average_gating_time_minutes: 95.0,
        p95_gating_time_minutes: 240.0,
        median_gating_time_minutes: 80.0,
        common_failure_reasons: BTreeMap::new(),
        failure_by_architecture: BTreeMap::new(),
        failure_by_time_of_day: BTreeMap::new(),
        failure_by_day_of_week: BTreeMap::new(),
        dependency_failure_correlation: BTreeMap::new(),
        average_maintainer_response_hours: None,
    }
}

fn prediction() -> GatingFailurePrediction {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    GatingFailurePrediction {
        package_name: "systemd".to_string(),
        prediction_timestamp: start + Duration::days(90),
        failure_probability: Score::new(0.2).unwrap(),
        confidence_interval: (Score::new(0.1).unwrap(), Score::new(0.3).unwrap()),
        model_confidence: Score::new(0.8).unwrap(),
        risk_factors: BTreeMap::new(),
        protective_factors: BTreeMap::new(),
        dependency_risk_propagation: BTreeMap::new(),
        optimal_submission_window: None,
        peak_risk_periods: Vec::new(),
        model_version: "v1".to_string(),
        training_data_period: (start, start + Duration::days(60)),
        feature_importance: BTreeMap::new(),
    }
}

#[test]
fn gating_stage_uses_koji_tag_names() {
    let stage: GatingStage = serde_json::from_str("\"c10s-pending-signed\"").unwrap();
    assert_eq!(stage, GatingStage::PendingSigned);
    assert_eq!(GatingStage::Gate.as_str(), "c10s-gate");
}

#[test]
fn package_status_reports_failed_tests() {
    let status: PackageGatingStatus = serde_json::from_value(json!({
        "package_name": "systemd",
        "nvr": "systemd-256-1.el10",
        "current_stage": "c10s-gate",
        "stage_entered_at": "2025-02-01T08:00:00Z",
        "blocked_by": ["glibc-2.39-1.el10"],
    }))
    .unwrap();
    assert!(status.is_blocked());
    assert_eq!(status.failed_tests().count(), 0);

    let status = PackageGatingStatus {
        rhel_ci_tests: vec![
            test_status("tier0", TestResult::Passed),
            test_status("tier1", TestResult::Failed),
        ],
        centos_stream_tests: vec![test_status("rpminspect", TestResult::Error)],
        blocked_by: Vec::new(),
        ..status
    };
    let failed: Vec<&str> = status.failed_tests().map(|t| t.test_name.as_str()).collect();
    assert_eq!(failed, vec!["tier1", "rpminspect"]);
    assert!(!status.is_blocked());
}

#[test]
fn historical_pattern_rejects_more_failures_than_builds() {
    assert!(pattern().validate().is_ok());

    let pattern = HistoricalGatingPattern {
        gating_failures: 21,
        ..pattern()
    };
    assert!(matches!(
        pattern.validate(),
        Err(ValidationError::InvalidInterval {
            field: "gating_failures",
            ..
        })
    ));
}

#[test]
fn historical_pattern_rejects_bad_hour_and_day() {
    let mut by_hour = pattern();
    by_hour
        .failure_by_time_of_day
        .insert(24, Score::new(0.5).unwrap());
    assert!(by_hour.validate().is_err());

    let mut by_day = pattern();
    by_day
        .failure_by_day_of_week
        .insert(6, Score::new(0.5).unwrap());
    assert!(by_day.validate().is_ok());
    by_day
        .failure_by_day_of_week
        .insert(7, Score::new(0.5).unwrap());
    assert!(by_day.validate().is_err());
}

#[test]
fn historical_pattern_deserialization_checks_rates() {
    let mut value = serde_json::to_value(pattern()).unwrap();
    value["failure_rate"] = json!(1.2);
    assert!(serde_json::from_value::<HistoricalGatingPattern>(value).is_err());
}

#[test]
fn environment_is_operational_only_when_both_ci_systems_are() {
    let status: GatingEnvironmentStatus = serde_json::from_value(json!({
        "timestamp": "2025-02-01T08:00:00Z",
        "rhel_ci_operational": true,
        "centos_stream_ci_operational": false,
    }))
    .unwrap();
    assert!(!status.is_fully_operational());

    let status = GatingEnvironmentStatus {
        centos_stream_ci_operational: true,
        ..status
    };
    assert!(status.is_fully_operational());
}

#[test]
fn readiness_requires_all_checks_and_no_blockers() {
    let assessment: BuildReadinessAssessment = serde_json::from_value(json!({
        "package_name": "bash",
        "target_branch": "c10s",
        "assessment_timestamp": "2025-02-01T08:00:00Z",
        "overall_risk_score": 0.2,
        "risk_level": "low",
        "recommended_action": "proceed",
        "confidence_score": 0.9,
        "spec_file_valid": true,
        "dependencies_available": true,
        "build_target_compatible": true,
        "source_accessible": true,
    }))
    .unwrap();
    assert!(assessment.packit_config_valid);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
    assert_eq!(assessment.recommended_action, RecommendedAction::Proceed);
    assert!(assessment.is_ready());

    let blocked = BuildReadinessAssessment {
        blocking_issues: vec!["glibc still in gating".to_string()],
        ..assessment.clone()
    };
    assert!(!blocked.is_ready());

    let invalid_spec = BuildReadinessAssessment {
        spec_file_valid: false,
        ..assessment
    };
    assert!(!invalid_spec.is_ready());
}

#[test]
fn prediction_point_estimate_must_be_inside_interval() {
    assert!(prediction().validate().is_ok());

    let outside = GatingFailurePrediction {
        failure_probability: Score::new(0.5).unwrap(),
        ..prediction()
    };
    assert!(matches!(
        outside.validate(),
        Err(ValidationError::OutOfRange {
            field: "failure_probability",
            ..
        })
    ));

    let inverted = GatingFailurePrediction {
        confidence_interval: (Score::new(0.3).unwrap(), Score::new(0.1).unwrap()),
        ..prediction()
    };
    assert!(matches!(
        inverted.validate(),
        Err(ValidationError::InvalidInterval {
            field: "confidence_interval",
            ..
        })
    ));
}

#[test]
fn prediction_windows_must_be_ordered() {
    let base = prediction();
    let (start, end) = base.training_data_period;
    let reversed = GatingFailurePrediction {
        peak_risk_periods: vec![(start, end), (end, start)],
        ..base
    };
    assert!(matches!(
        reversed.validate(),
        Err(ValidationError::InvalidInterval {
            field: "peak_risk_periods",
            ..
        })
    ));
}
