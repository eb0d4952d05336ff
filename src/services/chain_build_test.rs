//! Tests for chain build readiness and execution transitions

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::models::{
    BuildConfiguration, BuildGroup, BuildResult, BuildStatus, BuildTarget, ChainBuildExecution,
    ChainBuildPlan,
};
use crate::services::ExecutionError;

fn result(package: &str, status: BuildStatus) -> BuildResult {
    BuildResult::new(
        package,
        status,
        BuildConfiguration::new(BuildTarget::C10sBuild),
    )
}

fn execution(plan: ChainBuildPlan) -> ChainBuildExecution {
    ChainBuildExecution::new("exec-1", Arc::new(plan))
}

fn single_group_plan(packages: &[&str]) -> ChainBuildPlan {
    ChainBuildPlan::builder("plan-single", "c10s-build")
        .group(BuildGroup::new(1, packages.iter().copied()))
        .build()
        .unwrap()
}

/// a -> b
fn two_wave_plan() -> ChainBuildPlan {
    ChainBuildPlan::builder("plan-ab", "c10s-build")
        .group(BuildGroup::new(1, ["a"]))
        .group(BuildGroup::new(2, ["b"]).with_dependencies(["a"]))
        .build()
        .unwrap()
}

/// glibc -> {gcc, binutils} -> {systemd}
fn toolchain_plan() -> ChainBuildPlan {
    ChainBuildPlan::builder("plan-toolchain", "c10s-build")
        .group(BuildGroup::new(1, ["glibc"]))
        .group(BuildGroup::new(2, ["gcc", "binutils"]).with_dependencies(["glibc"]))
        .group(BuildGroup::new(3, ["systemd"]).with_dependencies(["gcc", "binutils"]))
        .build()
        .unwrap()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_single_package_is_ready_on_fresh_execution() {
    let execution = execution(single_group_plan(&["pkg1"]));
    assert_eq!(execution.next_ready_packages(), vec!["pkg1"]);
    assert_eq!(execution.current_status(), BuildStatus::Pending);
}

#[test]
fn test_second_wave_waits_for_first() {
    let mut execution = execution(two_wave_plan());
    assert_eq!(execution.next_ready_packages(), vec!["a"]);

    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.next_ready_packages(), vec!["b"]);
}

#[test]
fn test_failure_fails_execution_and_stops_offering_packages() {
    let mut execution = execution(two_wave_plan());
    execution
        .mark_completed("a", result("a", BuildStatus::Failed))
        .unwrap();

    assert_eq!(execution.current_status(), BuildStatus::Failed);
    assert!(execution.is_complete());
    assert!(execution.next_ready_packages().is_empty());
    assert!(execution.completed_at().is_none());
}

#[test]
fn test_all_packages_succeeding_completes_execution() {
    let mut execution = execution(single_group_plan(&["a", "b"]));
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Pending);
    assert_eq!(execution.progress_percentage(), 50.0);

    execution
        .mark_completed("b", result("b", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Success);
    assert!(execution.completed_at().is_some());
    assert_eq!(execution.progress_percentage(), 100.0);
    assert!(execution.next_ready_packages().is_empty());
}

#[test]
fn test_empty_plan_progress_is_zero() {
    let plan = ChainBuildPlan::builder("empty", "c10s-build").build().unwrap();
    let execution = execution(plan);
    assert_eq!(execution.plan().total_packages(), 0);
    assert_eq!(execution.progress_percentage(), 0.0);
    assert!(execution.next_ready_packages().is_empty());
}

#[test]
fn test_ready_packages_is_a_pure_query() {
    let plan = toolchain_plan();
    assert_eq!(plan.ready_packages(&set(&[])), vec!["glibc"]);
    assert_eq!(plan.ready_packages(&set(&["glibc"])), vec!["gcc", "binutils"]);
    assert_eq!(plan.ready_packages(&set(&["glibc", "gcc"])), vec!["binutils"]);
    assert_eq!(
        plan.ready_packages(&set(&["glibc", "gcc", "binutils"])),
        vec!["systemd"]
    );
    assert!(
        plan.ready_packages(&set(&["glibc", "gcc", "binutils", "systemd"]))
            .is_empty()
    );
    // Same input, same output.
    assert_eq!(
        plan.ready_packages(&set(&["glibc"])),
        plan.ready_packages(&set(&["glibc"]))
    );
}

#[test]
fn test_ready_packages_ignores_unknown_completed_names() {
    let plan = two_wave_plan();
    assert_eq!(plan.ready_packages(&set(&["zlib", "openssl"])), vec!["a"]);
}

#[test]
fn test_group_for_finds_owning_group() {
    let plan = toolchain_plan();
    assert_eq!(plan.group_for("binutils").map(|g| g.group_id), Some(2));
    assert!(plan.group_for("kernel").is_none());
}

#[test]
fn test_running_packages_are_not_offered_again() {
    let mut execution = execution(toolchain_plan());
    execution
        .mark_completed("glibc", result("glibc", BuildStatus::Success))
        .unwrap();
    execution.mark_started("gcc").unwrap();

    assert_eq!(execution.current_status(), BuildStatus::Running);
    assert!(execution.started_at().is_some());
    assert_eq!(execution.next_ready_packages(), vec!["binutils"]);
}

#[test]
fn test_mark_started_twice_is_rejected() {
    let mut execution = execution(two_wave_plan());
    execution.mark_started("a").unwrap();

    let err = execution.mark_started("a").unwrap_err();
    assert_eq!(
        err,
        ExecutionError::AlreadyRunning {
            package: "a".to_string()
        }
    );
    assert!(err.is_invalid_state());
    assert_eq!(execution.running_packages().len(), 1);
}

#[test]
fn test_mark_started_after_success_is_rejected() {
    let mut execution = execution(two_wave_plan());
    execution.mark_started("a").unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();

    let err = execution.mark_started("a").unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::AlreadyFinished {
            status: BuildStatus::Success,
            ..
        }
    ));
}

#[test]
fn test_unknown_package_is_rejected() {
    let mut execution = execution(two_wave_plan());

    let err = execution.mark_started("kernel").unwrap_err();
    assert!(matches!(err, ExecutionError::UnknownPackage { .. }));

    let err = execution
        .mark_completed("kernel", result("kernel", BuildStatus::Success))
        .unwrap_err();
    assert!(matches!(err, ExecutionError::UnknownPackage { .. }));
    assert!(execution.build_results().is_empty());
}

#[test]
fn test_mark_started_on_finished_execution_is_rejected() {
    let mut execution = execution(single_group_plan(&["a", "b"]));
    execution
        .mark_completed("a", result("a", BuildStatus::Failed))
        .unwrap();

    let err = execution.mark_started("b").unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::ExecutionComplete {
            status: BuildStatus::Failed,
            ..
        }
    ));
}

#[test]
fn test_repeated_success_report_is_idempotent() {
    let mut execution = execution(single_group_plan(&["a", "b"]));
    execution.mark_started("a").unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    let before = execution.clone();

    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();

    assert_eq!(execution.completed_packages(), before.completed_packages());
    assert_eq!(execution.failed_packages(), before.failed_packages());
    assert_eq!(execution.running_packages(), before.running_packages());
    assert_eq!(execution.current_status(), before.current_status());
    assert_eq!(execution.build_results().len(), 1);
}

#[test]
fn test_success_timestamp_is_not_restamped() {
    let mut execution = execution(single_group_plan(&["a"]));
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    let completed_at = execution.completed_at();

    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.completed_at(), completed_at);
}

#[test]
fn test_later_report_replaces_earlier_one() {
    let mut execution = execution(single_group_plan(&["a", "b"]));
    execution
        .mark_completed("a", result("a", BuildStatus::Failed))
        .unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();

    assert!(execution.completed_packages().contains("a"));
    assert!(!execution.failed_packages().contains("a"));
    assert_eq!(execution.build_results()["a"].status, BuildStatus::Success);
}

#[test]
fn test_success_report_clearing_last_failure_reopens_execution() {
    let mut execution = execution(single_group_plan(&["a", "b"]));
    execution.mark_started("a").unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Failed))
        .unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Failed);

    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();

    assert_eq!(execution.current_status(), BuildStatus::Running);
    assert!(execution.failed_packages().is_empty());
    assert!(execution.completed_at().is_none());
    assert_eq!(execution.next_ready_packages(), vec!["b".to_string()]);

    execution.mark_started("b").unwrap();
    execution
        .mark_completed("b", result("b", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Success);
    assert!(execution.completed_at().is_some());
}

#[test]
fn test_success_report_keeps_execution_failed_while_other_failures_remain() {
    let mut execution = execution(single_group_plan(&["a", "b", "c"]));
    for package in ["a", "b"] {
        execution
            .mark_completed(package, result(package, BuildStatus::Failed))
            .unwrap();
    }

    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();

    assert_eq!(execution.current_status(), BuildStatus::Failed);
    assert_eq!(execution.failed_packages(), &set(&["b"]));
    execution.retry_package("b").unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Running);
}

#[test]
fn test_failure_after_success_clears_completion_time() {
    let mut execution = execution(single_group_plan(&["a"]));
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    assert!(execution.completed_at().is_some());

    execution
        .mark_completed("a", result("a", BuildStatus::Failed))
        .unwrap();

    assert_eq!(execution.current_status(), BuildStatus::Failed);
    assert!(execution.completed_at().is_none());
}

#[test]
fn test_result_moves_package_out_of_running() {
    let mut execution = execution(single_group_plan(&["a", "b"]));
    execution.mark_started("a").unwrap();
    execution.mark_started("b").unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();

    assert_eq!(execution.running_packages(), &set(&["b"]));
    assert_eq!(execution.completed_packages(), &set(&["a"]));
}

#[test]
fn test_retry_returns_failed_execution_to_running() {
    let mut execution = execution(two_wave_plan());
    execution.mark_started("a").unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Failed))
        .unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Failed);

    execution.retry_package("a").unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Running);
    assert_eq!(execution.retry_count(), 1);
    assert!(execution.failed_packages().is_empty());
    assert!(!execution.build_results().contains_key("a"));
    assert_eq!(execution.next_ready_packages(), vec!["a"]);

    execution.mark_started("a").unwrap();
    execution
        .mark_completed("a", result("a", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.next_ready_packages(), vec!["b"]);
}

#[test]
fn test_retry_of_package_that_did_not_fail_is_rejected() {
    let mut execution = execution(two_wave_plan());
    let err = execution.retry_package("a").unwrap_err();
    assert_eq!(
        err,
        ExecutionError::NotFailed {
            package: "a".to_string()
        }
    );
    assert_eq!(execution.retry_count(), 0);
}

#[test]
fn test_cancel_stops_execution_but_records_in_flight_results() {
    let mut execution = execution(toolchain_plan());
    execution.mark_started("glibc").unwrap();
    execution.cancel(Some("mass rebuild paused".to_string())).unwrap();

    assert_eq!(execution.current_status(), BuildStatus::Canceled);
    assert_eq!(execution.error_message(), Some("mass rebuild paused"));
    assert!(execution.completed_at().is_some());
    assert!(execution.next_ready_packages().is_empty());

    execution
        .mark_completed("glibc", result("glibc", BuildStatus::Success))
        .unwrap();
    assert_eq!(execution.current_status(), BuildStatus::Canceled);
    assert!(execution.completed_packages().contains("glibc"));
    assert!(execution.running_packages().is_empty());
}

#[test]
fn test_cancel_twice_is_rejected() {
    let mut execution = execution(two_wave_plan());
    execution.cancel(None).unwrap();
    assert!(matches!(
        execution.cancel(None),
        Err(ExecutionError::ExecutionComplete { .. })
    ));
    assert!(matches!(
        execution.retry_package("a"),
        Err(ExecutionError::ExecutionComplete { .. })
    ));
}

#[test]
fn test_full_toolchain_run() {
    let mut execution = execution(toolchain_plan());

    loop {
        let ready = execution.next_ready_packages();
        if ready.is_empty() {
            break;
        }
        for package in &ready {
            execution.mark_started(package).unwrap();
        }
        for package in &ready {
            execution
                .mark_completed(package, result(package, BuildStatus::Success))
                .unwrap();
        }
    }

    assert_eq!(execution.current_status(), BuildStatus::Success);
    assert_eq!(execution.completed_packages().len(), 4);
    assert_eq!(execution.build_results().len(), 4);
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Start(usize),
    Complete(usize, bool),
    Retry(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Start),
        (0..4usize, any::<bool>()).prop_map(|(i, ok)| Op::Complete(i, ok)),
        (0..4usize).prop_map(Op::Retry),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_package_sets_stay_disjoint(ops in prop::collection::vec(op(), 0..40)) {
        let packages = ["glibc", "gcc", "binutils", "systemd"];
        let mut execution = execution(toolchain_plan());

        for op in ops {
            let finished_before =
                execution.completed_packages().len() + execution.failed_packages().len();
            let was_complete = execution.is_complete();

            let _ = match op {
                Op::Start(i) => execution.mark_started(packages[i]),
                Op::Complete(i, ok) => {
                    let status = if ok { BuildStatus::Success } else { BuildStatus::Failed };
                    execution.mark_completed(packages[i], result(packages[i], status))
                }
                Op::Retry(i) => execution.retry_package(packages[i]),
            };

            let completed = execution.completed_packages();
            let failed = execution.failed_packages();
            let running = execution.running_packages();
            prop_assert!(completed.is_disjoint(failed));
            prop_assert!(completed.is_disjoint(running));
            prop_assert!(failed.is_disjoint(running));

            let progress = execution.progress_percentage();
            prop_assert!((0.0..=100.0).contains(&progress));

            // Without a retry, nothing leaves the finished sets.
            if !matches!(op, Op::Retry(_)) {
                prop_assert!(completed.len() + failed.len() >= finished_before);
            }
            // Only clearing the last failure reopens a finished execution.
            if was_complete && !execution.is_complete() {
                prop_assert!(matches!(op, Op::Retry(_) | Op::Complete(_, true)));
                prop_assert!(failed.is_empty());
            }
            match execution.current_status() {
                BuildStatus::Failed => prop_assert!(!failed.is_empty()),
                BuildStatus::Success => prop_assert_eq!(completed.len(), packages.len()),
                _ => {}
            }
            // An open execution with nothing in flight always has work to offer.
            if !execution.is_complete() && running.is_empty() {
                prop_assert!(!execution.next_ready_packages().is_empty());
            }

            for package in execution.next_ready_packages() {
                prop_assert!(!completed.contains(&package));
                prop_assert!(!running.contains(&package));
                prop_assert!(!failed.contains(&package));
            }
        }
    }
}
