//! The POSIX smoke scenario run for real against a temp directory through
//! `LocalTransport`.

use std::sync::Arc;
use std::time::Duration;

use fanout_core::dispatch::{Dispatcher, LocalTransport};
use fanout_core::error::{DispatchError, HarnessError};
use fanout_core::harness::{self, RunOptions, Scenario, ScenarioParams, Step};
use fanout_core::HostSet;
use pretty_assertions::assert_eq;

fn local_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(LocalTransport::new()))
}

fn one_host() -> HostSet {
    "node1".parse().unwrap()
}

fn opts() -> RunOptions {
    RunOptions {
        step_timeout: Duration::from_secs(10),
        progress: false,
    }
}

#[tokio::test]
async fn full_smoke_sequence_passes_and_cleans_up() {
    let tmp = tempfile::tempdir().unwrap();
    let mount_dir = tmp.path().display().to_string();
    let params = ScenarioParams::default();
    let scenario = Scenario::posix_smoke(&mount_dir, &params);

    let report = harness::run_scenario(&local_dispatcher(), &one_host(), &scenario, &opts())
        .await
        .unwrap();

    assert_eq!(report.steps_run, 14);
    // rmdir at the end removed the scenario directory
    assert!(!tmp.path().join(&params.dir_name).exists());
}

#[tokio::test]
async fn failing_step_reports_step_command_and_hosts() {
    let tmp = tempfile::tempdir().unwrap();
    let scenario = Scenario {
        steps: vec![
            Step::new("mkdir", format!("mkdir -p {}/d", tmp.path().display())),
            Step::new("rm missing", format!("rm {}/d/absent", tmp.path().display())),
            Step::new("never reached", "true"),
        ],
    };

    let err = harness::run_scenario(&local_dispatcher(), &one_host(), &scenario, &opts())
        .await
        .unwrap_err();

    match err {
        HarnessError::StepFailed {
            label,
            command,
            hosts,
        } => {
            assert_eq!(label, "rm missing");
            assert!(command.contains("/d/absent"));
            assert_eq!(hosts, "node1");
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_step_stops_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let witness = tmp.path().join("witness");
    let scenario = Scenario {
        steps: vec![
            Step::new("fail", "false"),
            Step::new("witness", format!("touch {}", witness.display())),
        ],
    };

    let err = harness::run_scenario(&local_dispatcher(), &one_host(), &scenario, &opts()).await;
    assert!(err.is_err());
    assert!(!witness.exists(), "later steps must not run after a failure");
}

#[tokio::test]
async fn hanging_step_surfaces_the_dispatch_timeout() {
    let scenario = Scenario {
        steps: vec![Step::new("hang", "sleep 5")],
    };
    let opts = RunOptions {
        step_timeout: Duration::from_millis(200),
        progress: false,
    };

    let err = harness::run_scenario(&local_dispatcher(), &one_host(), &scenario, &opts)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Dispatch(DispatchError::Timeout(_))
    ));
}

#[tokio::test]
async fn check_dir_exists_tracks_the_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dispatcher = local_dispatcher();
    let hosts = one_host();
    let dir = tmp.path().join("probe").display().to_string();
    let timeout = Duration::from_secs(10);

    assert!(!harness::check_dir_exists(&dispatcher, &hosts, &dir, timeout)
        .await
        .unwrap());

    std::fs::create_dir(tmp.path().join("probe")).unwrap();
    assert!(harness::check_dir_exists(&dispatcher, &hosts, &dir, timeout)
        .await
        .unwrap());
}
