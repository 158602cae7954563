// Multi-stage scan pipeline

use std::time::Duration;

use chrono::Utc;

use crate::broadcaster::LogBroadcaster;
use crate::models::{Report, ScanMode};
use crate::scoring;
use crate::telemetry::Telemetry;

/// Processes retained per report, ranked by CPU usage.
pub const TOP_PROCESSES: usize = 8;

/// Stage timing knobs, built from the `[scan]` config section.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub cpu_sample: Duration,
    pub probe_addr: String,
    pub probe_timeout: Duration,
    pub log_tail_lines: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            cpu_sample: Duration::from_millis(1000),
            probe_addr: "8.8.8.8:53".into(),
            probe_timeout: Duration::from_millis(2000),
            log_tail_lines: 250,
        }
    }
}

/// A stage that gave up. Rendered into the log stream; the report field it
/// would have filled stays empty.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
struct StageError {
    stage: &'static str,
    #[source]
    source: anyhow::Error,
}

fn stage<T>(
    log: &LogBroadcaster,
    stage: &'static str,
    run: impl FnOnce() -> anyhow::Result<T>,
) -> Option<T> {
    match run() {
        Ok(value) => Some(value),
        Err(source) => {
            log.emit(&format!("{}; continuing", StageError { stage, source }));
            None
        }
    }
}

/// Run one scan to completion. Blocking; call from a blocking task. Stages
/// run in a fixed order and are individually best-effort: a failing stage
/// logs the failure, leaves its fields empty and the scan keeps going.
pub fn run_scan(
    mode: ScanMode,
    telemetry: &dyn Telemetry,
    log: &LogBroadcaster,
    options: &ScanOptions,
) -> Report {
    let started = std::time::Instant::now();
    let collected_at = Utc::now();
    log.emit(&format!("starting {} scan", mode));

    let host = telemetry.hostname();
    let platform = telemetry.platform();
    let ip = telemetry
        .primary_ipv4()
        .unwrap_or_else(|| "unavailable".into());
    log.emit(&format!("host {} ({}), ip {}", host, platform, ip));

    log.emit(&format!(
        "sampling cpu over {} ms",
        options.cpu_sample.as_millis()
    ));
    let cpu_percent = stage(log, "cpu sample", || telemetry.cpu_percent(options.cpu_sample));
    if let Some(cpu) = cpu_percent {
        log.emit(&format!("cpu at {:.1}%", cpu));
    }

    let memory_percent = stage(log, "memory", || telemetry.memory_percent());
    if let Some(memory) = memory_percent {
        log.emit(&format!("memory at {:.1}%", memory));
    }

    let disks = stage(log, "disks", || telemetry.disks()).unwrap_or_default();
    log.emit(&format!("{} filesystems inspected", disks.len()));

    let interfaces = stage(log, "interfaces", || telemetry.interfaces()).unwrap_or_default();
    log.emit(&format!("probing connectivity via {}", options.probe_addr));
    let online = telemetry.probe_tcp(&options.probe_addr, options.probe_timeout);
    log.emit(if online {
        "network reachable"
    } else {
        "network unreachable"
    });

    let processes =
        stage(log, "processes", || telemetry.top_processes(TOP_PROCESSES)).unwrap_or_default();
    log.emit(&format!("{} busiest processes captured", processes.len()));

    let mut listening = None;
    let mut established = None;
    let mut services = None;
    let mut log_snippet = None;
    if mode == ScanMode::Deep {
        log.emit("collecting socket table");
        if let Some((listen, estab)) = stage(log, "socket table", || telemetry.socket_table()) {
            log.emit(&format!(
                "{} listening, {} established",
                listen.len(),
                estab.len()
            ));
            listening = Some(listen);
            established = Some(estab);
        }

        log.emit("collecting service snapshot");
        if let Some(list) = stage(log, "services", || telemetry.services()) {
            log.emit(&format!("{} services running", list.len()));
            services = Some(list);
        }

        log.emit("reading system log tail");
        log_snippet = stage(log, "log tail", || {
            telemetry.log_tail(options.log_tail_lines)
        });
    }

    let mut report = Report {
        host,
        platform,
        ip,
        collected_at,
        mode,
        cpu_percent,
        memory_percent,
        disks,
        processes,
        interfaces,
        network_online: Some(online),
        listening,
        established,
        services,
        log_snippet,
        score: 0,
        remediations: Vec::new(),
    };
    let (score, remediations) = scoring::score_report(&report);
    report.score = score;
    report.remediations = remediations;
    log.emit(&format!("health score {}", report.score));
    log.emit(&format!(
        "{} scan finished in {:.1}s",
        mode,
        started.elapsed().as_secs_f64()
    ));
    report
}
