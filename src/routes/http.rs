// Request handlers: scan control, report reads, process actions

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::actions::{self, BoostMode};
use crate::models::ScanMode;
use crate::report_repo;
use crate::runner::StartOutcome;
use crate::telemetry::ActionError;
use crate::version::{NAME, VERSION};

/// Success envelope for action responses; the outcome fields are flattened
/// next to the status.
#[derive(Serialize)]
struct ActionOk<T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    outcome: T,
}

fn error_response(code: StatusCode, detail: impl std::fmt::Display) -> Response {
    (
        code,
        Json(json!({ "status": "error", "detail": detail.to_string() })),
    )
        .into_response()
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct StartScanRequest {
    mode: Option<ScanMode>,
}

/// POST /start-scan — kick off a scan. A missing body or mode means quick.
/// 202 when the scan was claimed, 409 when one is already in flight.
pub(super) async fn start_scan_handler(
    State(state): State<AppState>,
    body: Option<Json<StartScanRequest>>,
) -> impl IntoResponse {
    let mode = body
        .and_then(|Json(req)| req.mode)
        .unwrap_or(ScanMode::Quick);
    match state.runner.try_start(mode) {
        StartOutcome::Started => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "started", "mode": mode })),
        ),
        StartOutcome::Busy => (StatusCode::CONFLICT, Json(json!({ "status": "busy" }))),
    }
}

/// GET /status — run state snapshot.
pub(super) async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.runner.status())
}

/// GET /data and GET /report/latest — the most recent report, or an
/// aggregate fallback carrying the history when no scan has completed yet.
pub(super) async fn latest_report_handler(State(state): State<AppState>) -> Response {
    match state.repo.latest() {
        Some(report) => Json(report).into_response(),
        None => Json(json!({ "status": "no_report", "history": state.repo.history() }))
            .into_response(),
    }
}

/// GET /history — scan summaries, most recent last.
pub(super) async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.repo.history())
}

/// GET /reports — ids of every persisted report.
pub(super) async fn list_reports_handler(State(state): State<AppState>) -> Response {
    match state.repo.list_report_ids().await {
        Ok(ids) => Json(ids).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "list_reports", "report listing failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "report listing failed")
        }
    }
}

/// GET /download/{id} — raw persisted report bytes.
pub(super) async fn download_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    if !report_repo::valid_report_id(&id) {
        return error_response(StatusCode::BAD_REQUEST, "malformed report id");
    }
    match state.repo.read_report_bytes(&id).await {
        Ok(Some(bytes)) => {
            ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "report not found"),
        Err(e) => {
            tracing::warn!(error = %e, operation = "download_report", "report read failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "report read failed")
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PidRequest {
    pid: u32,
}

pub(super) async fn kill_handler(
    State(state): State<AppState>,
    Json(req): Json<PidRequest>,
) -> Response {
    let telemetry = state.telemetry.clone();
    let result = tokio::task::spawn_blocking(move || telemetry.kill_process(req.pid)).await;
    signal_response("kill", req.pid, result)
}

pub(super) async fn suspend_handler(
    State(state): State<AppState>,
    Json(req): Json<PidRequest>,
) -> Response {
    let telemetry = state.telemetry.clone();
    let result = tokio::task::spawn_blocking(move || telemetry.suspend_process(req.pid)).await;
    signal_response("suspend", req.pid, result)
}

pub(super) async fn resume_handler(
    State(state): State<AppState>,
    Json(req): Json<PidRequest>,
) -> Response {
    let telemetry = state.telemetry.clone();
    let result = tokio::task::spawn_blocking(move || telemetry.resume_process(req.pid)).await;
    signal_response("resume", req.pid, result)
}

fn signal_response(
    action: &str,
    pid: u32,
    result: Result<Result<(), ActionError>, tokio::task::JoinError>,
) -> Response {
    match result {
        Ok(Ok(())) => {
            Json(json!({ "status": "ok", "action": action, "pid": pid })).into_response()
        }
        Ok(Err(e)) => {
            let code = match e {
                ActionError::NotFound(_) => StatusCode::NOT_FOUND,
                ActionError::Unsupported => StatusCode::NOT_IMPLEMENTED,
                ActionError::SignalFailed(_) | ActionError::Unavailable => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            error_response(code, e)
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("action task join: {}", e),
        ),
    }
}

/// POST /action/clear_temp — sweep stale files from the OS temp directory.
pub(super) async fn clear_temp_handler() -> Response {
    match actions::clear_temp().await {
        Ok(stats) => Json(ActionOk {
            status: "ok",
            outcome: stats,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "clear_temp", "temp sweep failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct BoostRequest {
    mode: Option<BoostMode>,
}

/// POST /action/boost — free resources; a missing body or mode means soft.
pub(super) async fn boost_handler(body: Option<Json<BoostRequest>>) -> Response {
    let mode = body
        .and_then(|Json(req)| req.mode)
        .unwrap_or(BoostMode::Soft);
    match actions::boost(mode).await {
        Ok(outcome) => Json(ActionOk {
            status: "ok",
            outcome,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "boost", "boost failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
