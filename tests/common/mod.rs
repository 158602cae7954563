// Shared test helpers
#![allow(dead_code)]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use hostpulse::models::*;
use hostpulse::telemetry::{ActionError, Telemetry};

/// Canned telemetry with tunable signals and failure switches.
pub struct FakeTelemetry {
    pub cpu: f64,
    pub memory: f64,
    pub disk_percent: f64,
    pub online: bool,
    pub fail_disks: bool,
    /// Artificial latency applied inside the CPU sample stage.
    pub scan_delay: Duration,
}

impl Default for FakeTelemetry {
    fn default() -> Self {
        Self {
            cpu: 12.0,
            memory: 40.0,
            disk_percent: 55.0,
            online: true,
            fail_disks: false,
            scan_delay: Duration::ZERO,
        }
    }
}

impl Telemetry for FakeTelemetry {
    fn hostname(&self) -> String {
        "testhost".into()
    }

    fn platform(&self) -> String {
        "TestOS 1.0".into()
    }

    fn primary_ipv4(&self) -> Option<String> {
        Some("192.168.1.10".into())
    }

    fn cpu_percent(&self, _sample: Duration) -> anyhow::Result<f64> {
        if !self.scan_delay.is_zero() {
            std::thread::sleep(self.scan_delay);
        }
        Ok(self.cpu)
    }

    fn memory_percent(&self) -> anyhow::Result<f64> {
        Ok(self.memory)
    }

    fn disks(&self) -> anyhow::Result<Vec<DiskInfo>> {
        if self.fail_disks {
            anyhow::bail!("disk enumeration unavailable");
        }
        Ok(vec![disk("/", self.disk_percent)])
    }

    fn interfaces(&self) -> anyhow::Result<Vec<InterfaceInfo>> {
        Ok(vec![InterfaceInfo {
            name: "eth0".into(),
            ipv4: vec!["192.168.1.10".into()],
        }])
    }

    fn probe_tcp(&self, _addr: &str, _timeout: Duration) -> bool {
        self.online
    }

    fn top_processes(&self, limit: usize) -> anyhow::Result<Vec<ProcessInfo>> {
        Ok((0..3)
            .take(limit)
            .map(|i| ProcessInfo {
                pid: 100 + i as u32,
                name: format!("proc{}", i),
                cpu_percent: 10.0 - i as f32,
                memory_bytes: 1024 * (i as u64 + 1),
            })
            .collect())
    }

    fn socket_table(&self) -> anyhow::Result<(Vec<SocketInfo>, Vec<ConnectionInfo>)> {
        Ok((
            vec![SocketInfo {
                pid: Some(1),
                process: Some("sshd".into()),
                local_addr: "0.0.0.0:22".into(),
            }],
            vec![ConnectionInfo {
                pid: Some(1),
                process: Some("sshd".into()),
                local_addr: "192.168.1.10:22".into(),
                remote_addr: "192.168.1.20:50000".into(),
                status: "ESTAB".into(),
            }],
        ))
    }

    fn services(&self) -> anyhow::Result<Vec<ServiceInfo>> {
        Ok(vec![ServiceInfo {
            name: "sshd".into(),
            description: "OpenSSH server".into(),
        }])
    }

    fn log_tail(&self, max_lines: usize) -> anyhow::Result<String> {
        Ok(format!("Aug 22 12:00:00 testhost kernel: up ({} lines requested)", max_lines))
    }

    fn kill_process(&self, pid: u32) -> Result<(), ActionError> {
        if pid == 4242 {
            Ok(())
        } else {
            Err(ActionError::NotFound(pid))
        }
    }

    fn suspend_process(&self, pid: u32) -> Result<(), ActionError> {
        self.kill_process(pid)
    }

    fn resume_process(&self, pid: u32) -> Result<(), ActionError> {
        self.kill_process(pid)
    }
}

pub fn disk(mount: &str, percent: f64) -> DiskInfo {
    let total: u64 = 100 * 1024 * 1024 * 1024;
    let used = (total as f64 * percent / 100.0) as u64;
    DiskInfo {
        mount: mount.into(),
        name: "sda1".into(),
        fs_type: "ext4".into(),
        total_bytes: total,
        used_bytes: used,
        free_bytes: total - used,
        percent,
    }
}

/// A healthy quick-scan report; tests override the signals they care about.
pub fn base_report() -> Report {
    Report {
        host: "testhost".into(),
        platform: "TestOS 1.0".into(),
        ip: "192.168.1.10".into(),
        collected_at: Utc.with_ymd_and_hms(2026, 8, 22, 12, 0, 0).unwrap(),
        mode: ScanMode::Quick,
        cpu_percent: Some(10.0),
        memory_percent: Some(40.0),
        disks: vec![disk("/", 50.0)],
        processes: vec![],
        interfaces: vec![],
        network_online: Some(true),
        listening: None,
        established: None,
        services: None,
        log_snippet: None,
        score: 0,
        remediations: vec![],
    }
}
