// HTTP routes and the live log stream

mod http;
mod stream;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::broadcaster::LogBroadcaster;
use crate::config::AppConfig;
use crate::report_repo::ReportRepo;
use crate::runner::JobRunner;
use crate::telemetry::Telemetry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) runner: JobRunner,
    pub(crate) repo: Arc<ReportRepo>,
    pub(crate) telemetry: Arc<dyn Telemetry>,
    pub(crate) broadcaster: LogBroadcaster,
    pub(crate) config: AppConfig,
}

pub fn app(
    runner: JobRunner,
    repo: Arc<ReportRepo>,
    telemetry: Arc<dyn Telemetry>,
    broadcaster: LogBroadcaster,
    config: AppConfig,
) -> Router {
    let state = AppState {
        runner,
        repo,
        telemetry,
        broadcaster,
        config,
    };
    Router::new()
        .route("/", get(|| async { "hostpulse: on-demand host health scans" }))
        .route("/version", get(http::version_handler))
        .route("/start-scan", post(http::start_scan_handler))
        .route("/status", get(http::status_handler))
        .route("/data", get(http::latest_report_handler))
        .route("/report/latest", get(http::latest_report_handler))
        .route("/history", get(http::history_handler))
        .route("/reports", get(http::list_reports_handler))
        .route("/download/{id}", get(http::download_handler))
        .route("/stream", get(stream::stream_handler))
        .route("/action/kill", post(http::kill_handler))
        .route("/action/suspend", post(http::suspend_handler))
        .route("/action/resume", post(http::resume_handler))
        .route("/action/clear_temp", post(http::clear_temp_handler))
        .route("/action/boost", post(http::boost_handler))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
