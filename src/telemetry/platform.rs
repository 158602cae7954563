// Platform-specific collectors: socket table, service snapshot, system log tail.

use std::io::{Read, Seek, SeekFrom};
use std::process::Command;

use anyhow::Context;

use crate::models::{ConnectionInfo, ServiceInfo, SocketInfo};

/// Candidate system log paths, checked in order. Distros disagree on the name.
const LOG_CANDIDATES: &[&str] = &["/var/log/syslog", "/var/log/messages", "/var/log/system.log"];

/// Stored in place of a log snippet when no candidate path exists.
const NO_LOG_SENTINEL: &str = "no system log file found";

/// Daemon process names treated as services on hosts without systemd.
const KNOWN_DAEMONS: &[&str] = &[
    "sshd",
    "nginx",
    "httpd",
    "apache2",
    "dockerd",
    "containerd",
    "postgres",
    "mysqld",
    "mariadbd",
    "redis-server",
    "mongod",
    "cron",
    "crond",
    "launchd",
    "smbd",
    "cupsd",
];

pub(super) fn socket_table() -> anyhow::Result<(Vec<SocketInfo>, Vec<ConnectionInfo>)> {
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("ss")
            .args(["-tanp"])
            .output()
            .context("running ss")?;
        anyhow::ensure!(output.status.success(), "ss exited with {}", output.status);
        Ok(parse_ss(&String::from_utf8_lossy(&output.stdout)))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let listening = lsof_rows(&["-iTCP", "-sTCP:LISTEN", "-nP", "-F", "pcn"])?
            .into_iter()
            .map(|(pid, process, addr)| SocketInfo {
                pid,
                process,
                local_addr: addr,
            })
            .collect();
        let established = lsof_rows(&["-iTCP", "-sTCP:ESTABLISHED", "-nP", "-F", "pcn"])?
            .into_iter()
            .filter_map(|(pid, process, addr)| {
                let (local, remote) = addr.split_once("->")?;
                Some(ConnectionInfo {
                    pid,
                    process,
                    local_addr: local.to_string(),
                    remote_addr: remote.to_string(),
                    status: "ESTABLISHED".into(),
                })
            })
            .collect();
        Ok((listening, established))
    }
}

#[cfg(target_os = "linux")]
fn parse_ss(output: &str) -> (Vec<SocketInfo>, Vec<ConnectionInfo>) {
    let mut listening = Vec::new();
    let mut established = Vec::new();
    for line in output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }
        let (pid, process) = parts
            .get(5)
            .map(|p| parse_ss_process(p))
            .unwrap_or((None, None));
        match parts[0] {
            "LISTEN" => listening.push(SocketInfo {
                pid,
                process,
                local_addr: parts[3].to_string(),
            }),
            state if !parts[4].ends_with(":*") => established.push(ConnectionInfo {
                pid,
                process,
                local_addr: parts[3].to_string(),
                remote_addr: parts[4].to_string(),
                status: state.to_string(),
            }),
            _ => {}
        }
    }
    (listening, established)
}

/// Extract pid and name from an ss process column: users:(("nginx",pid=777,fd=6))
#[cfg(target_os = "linux")]
fn parse_ss_process(field: &str) -> (Option<u32>, Option<String>) {
    let name = field.split('"').nth(1).map(|s| s.to_string());
    let pid = field
        .split("pid=")
        .nth(1)
        .and_then(|rest| rest.split(',').next())
        .and_then(|s| s.parse().ok());
    (pid, name)
}

/// Run lsof with `-F pcn` field output and fold the p/c/n records into rows.
/// lsof exits non-zero when nothing matches, with empty stdout.
#[cfg(not(target_os = "linux"))]
fn lsof_rows(args: &[&str]) -> anyhow::Result<Vec<(Option<u32>, Option<String>, String)>> {
    let output = Command::new("lsof").args(args).output().context("running lsof")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut rows = Vec::new();
    let mut pid: Option<u32> = None;
    let mut name: Option<String> = None;
    for line in stdout.lines() {
        if let Some(p) = line.strip_prefix('p') {
            pid = p.parse().ok();
        } else if let Some(c) = line.strip_prefix('c') {
            name = Some(c.to_string());
        } else if let Some(n) = line.strip_prefix('n') {
            rows.push((pid, name.clone(), n.to_string()));
        }
    }
    Ok(rows)
}

pub(super) fn systemd_services() -> anyhow::Result<Vec<ServiceInfo>> {
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("systemctl")
            .args([
                "list-units",
                "--type=service",
                "--state=running",
                "--no-pager",
                "--no-legend",
                "--plain",
            ])
            .output()
            .context("running systemctl")?;
        anyhow::ensure!(
            output.status.success(),
            "systemctl exited with {}",
            output.status
        );
        let mut services = Vec::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                continue;
            }
            services.push(ServiceInfo {
                name: parts[0].trim_end_matches(".service").to_string(),
                description: parts[4..].join(" "),
            });
        }
        Ok(services)
    }
    #[cfg(not(target_os = "linux"))]
    anyhow::bail!("systemd not available on this platform")
}

/// Fallback service snapshot: running processes whose name matches a known
/// daemon. A heuristic, not a service-manager integration.
pub(super) fn daemon_heuristic(process_names: &[String]) -> Vec<ServiceInfo> {
    let mut services: Vec<ServiceInfo> = process_names
        .iter()
        .filter(|n| KNOWN_DAEMONS.contains(&n.as_str()))
        .map(|n| ServiceInfo {
            name: n.clone(),
            description: "running process".into(),
        })
        .collect();
    services.sort_by(|a, b| a.name.cmp(&b.name));
    services.dedup_by(|a, b| a.name == b.name);
    services
}

pub(super) fn log_tail(max_lines: usize) -> anyhow::Result<String> {
    let Some(path) = LOG_CANDIDATES.iter().find(|p| std::path::Path::new(p).exists()) else {
        return Ok(NO_LOG_SENTINEL.to_string());
    };
    let mut file = std::fs::File::open(path).with_context(|| format!("opening {path}"))?;
    let len = file.metadata().with_context(|| format!("stat {path}"))?.len();

    // 256 bytes per line is generous for syslog-format lines; reading one
    // bounded block from the end avoids scanning multi-hundred-MB logs.
    let window = (max_lines as u64).saturating_mul(256).min(len);
    file.seek(SeekFrom::End(-(window as i64)))
        .with_context(|| format!("seeking {path}"))?;
    let mut buf = Vec::with_capacity(window as usize);
    file.read_to_end(&mut buf)
        .with_context(|| format!("reading {path}"))?;

    let text = String::from_utf8_lossy(&buf);
    let mut lines: Vec<&str> = text.lines().collect();
    // The first line of the window is usually cut mid-line by the seek.
    if window < len && lines.len() > 1 {
        lines.remove(0);
    }
    let start = lines.len().saturating_sub(max_lines);
    Ok(lines[start..].join("\n"))
}
