// Single-flight scan orchestration

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::broadcaster::LogBroadcaster;
use crate::forwarder::Forwarder;
use crate::models::{HistoryEntry, RunState, ScanMode};
use crate::report_repo::ReportRepo;
use crate::scan::{self, ScanOptions};
use crate::telemetry::Telemetry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    Busy,
}

/// Owns the one-scan-at-a-time rule. All state transitions go through the
/// single internal mutex; readers get cloned snapshots.
#[derive(Clone)]
pub struct JobRunner {
    state: Arc<Mutex<RunState>>,
    telemetry: Arc<dyn Telemetry>,
    repo: Arc<ReportRepo>,
    log: LogBroadcaster,
    options: ScanOptions,
    forwarder: Option<Forwarder>,
}

impl JobRunner {
    pub fn new(
        telemetry: Arc<dyn Telemetry>,
        repo: Arc<ReportRepo>,
        log: LogBroadcaster,
        options: ScanOptions,
        forwarder: Option<Forwarder>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(RunState::default())),
            telemetry,
            repo,
            log,
            options,
            forwarder,
        }
    }

    /// Claim the runner and spawn the scan, or report Busy. The busy check
    /// and the transition to running happen under one lock acquisition, so
    /// two concurrent starts can never both win. A rejected start leaves the
    /// in-flight scan's mode and start time untouched.
    pub fn try_start(&self, mode: ScanMode) -> StartOutcome {
        {
            let mut state = self.lock_state();
            if state.running {
                return StartOutcome::Busy;
            }
            state.running = true;
            state.mode = Some(mode);
            state.started_at = Some(Utc::now());
        }
        let runner = self.clone();
        tokio::spawn(async move { runner.execute(mode).await });
        StartOutcome::Started
    }

    /// Snapshot of the current run state. Safe to call at any time.
    pub fn status(&self) -> RunState {
        self.lock_state().clone()
    }

    async fn execute(&self, mode: ScanMode) {
        let telemetry = Arc::clone(&self.telemetry);
        let log = self.log.clone();
        let options = self.options.clone();
        let result = tokio::task::spawn_blocking(move || {
            scan::run_scan(mode, telemetry.as_ref(), &log, &options)
        })
        .await;

        match result {
            Ok(report) => {
                match self.repo.save_report(&report).await {
                    Ok(id) => {
                        tracing::debug!(operation = "save_report", id = %id, "report persisted");
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            operation = "save_report",
                            "failed to persist report"
                        );
                    }
                }
                if let Err(e) = self
                    .repo
                    .append_history(HistoryEntry::from_report(&report))
                    .await
                {
                    tracing::warn!(
                        error = %e,
                        operation = "append_history",
                        "failed to persist history"
                    );
                }
                if let Some(forwarder) = &self.forwarder {
                    forwarder.forward(&report).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, operation = "run_scan", "scan task failed");
                self.log.emit("scan aborted by internal error");
            }
        }

        // Unconditional: whatever happened above, the runner is usable again.
        let mut state = self.lock_state();
        state.running = false;
        state.mode = None;
        state.started_at = None;
    }

    // A poisoned state lock still holds valid data; recover and continue so
    // the runner can always return to idle.
    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
