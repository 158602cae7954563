// Single-flight runner tests

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FakeTelemetry;
use hostpulse::broadcaster::LogBroadcaster;
use hostpulse::models::ScanMode;
use hostpulse::report_repo::ReportRepo;
use hostpulse::runner::{JobRunner, StartOutcome};
use hostpulse::scan::ScanOptions;

fn test_runner(telemetry: FakeTelemetry, dir: &std::path::Path) -> (JobRunner, Arc<ReportRepo>) {
    let repo = Arc::new(ReportRepo::open(dir).expect("open repo"));
    let runner = JobRunner::new(
        Arc::new(telemetry),
        Arc::clone(&repo),
        LogBroadcaster::new(64),
        ScanOptions::default(),
        None,
    );
    (runner, repo)
}

async fn wait_idle(runner: &JobRunner) {
    for _ in 0..500 {
        if !runner.status().running {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("runner did not return to idle");
}

#[tokio::test]
async fn test_second_start_is_rejected_while_running() {
    let dir = tempfile::TempDir::new().unwrap();
    let telemetry = FakeTelemetry {
        scan_delay: Duration::from_millis(300),
        ..FakeTelemetry::default()
    };
    let (runner, _repo) = test_runner(telemetry, dir.path());

    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Started);
    assert!(runner.status().running);
    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Busy);

    wait_idle(&runner).await;
    let done = runner.status();
    assert!(!done.running);
    assert!(done.mode.is_none());
    assert!(done.started_at.is_none());
}

#[tokio::test]
async fn test_busy_rejection_preserves_running_scan_state() {
    let dir = tempfile::TempDir::new().unwrap();
    let telemetry = FakeTelemetry {
        scan_delay: Duration::from_millis(300),
        ..FakeTelemetry::default()
    };
    let (runner, _repo) = test_runner(telemetry, dir.path());

    runner.try_start(ScanMode::Deep);
    let before = runner.status();
    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Busy);
    let after = runner.status();

    assert_eq!(after.mode, Some(ScanMode::Deep));
    assert_eq!(after.started_at, before.started_at);

    wait_idle(&runner).await;
}

#[tokio::test]
async fn test_completed_scan_persists_latest_and_history() {
    let dir = tempfile::TempDir::new().unwrap();
    let (runner, repo) = test_runner(FakeTelemetry::default(), dir.path());

    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Started);
    wait_idle(&runner).await;

    let latest = repo.latest().expect("latest report");
    assert_eq!(latest.host, "testhost");
    assert_eq!(latest.mode, ScanMode::Quick);
    assert_eq!(repo.history().len(), 1);
    assert_eq!(repo.list_report_ids().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_runner_accepts_new_scan_after_completion() {
    let dir = tempfile::TempDir::new().unwrap();
    let (runner, repo) = test_runner(FakeTelemetry::default(), dir.path());

    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Started);
    wait_idle(&runner).await;
    assert_eq!(runner.try_start(ScanMode::Deep), StartOutcome::Started);
    wait_idle(&runner).await;

    assert_eq!(repo.history().len(), 2);
    let latest = repo.latest().expect("latest report");
    assert_eq!(latest.mode, ScanMode::Deep);
}

#[tokio::test]
async fn test_persistence_failure_still_returns_runner_to_idle() {
    let dir = tempfile::TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let (runner, repo) = test_runner(FakeTelemetry::default(), &data_dir);

    // Pull the directory out from under the store; every write now fails.
    std::fs::remove_dir_all(&data_dir).unwrap();

    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Started);
    wait_idle(&runner).await;

    assert!(!runner.status().running);
    assert!(repo.latest().is_none());
    assert_eq!(runner.try_start(ScanMode::Quick), StartOutcome::Started);
    wait_idle(&runner).await;
}
