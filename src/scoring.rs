// Health scoring over a completed report

use crate::models::{Remediation, Report};

const CPU_HIGH_THRESHOLD: f64 = 90.0;
const CPU_HIGH_PENALTY: u32 = 40;
const CPU_MODERATE_THRESHOLD: f64 = 75.0;
const CPU_MODERATE_PENALTY: u32 = 15;

const MEMORY_HIGH_THRESHOLD: f64 = 95.0;
const MEMORY_HIGH_PENALTY: u32 = 35;
const MEMORY_MODERATE_THRESHOLD: f64 = 85.0;
const MEMORY_MODERATE_PENALTY: u32 = 12;

const DISK_HIGH_THRESHOLD: f64 = 95.0;
const DISK_HIGH_PENALTY: u32 = 35;
const DISK_MODERATE_THRESHOLD: f64 = 90.0;
const DISK_MODERATE_PENALTY: u32 = 12;

const NETWORK_OFFLINE_PENALTY: u32 = 37;

/// Score a report from its raw signals: start at 100, apply independent
/// additive deductions, clamp at 0. Signals the scan could not collect
/// (`None`) deduct nothing. Pure; safe to re-run on a persisted report.
pub fn score_report(report: &Report) -> (u8, Vec<Remediation>) {
    let mut penalty: u32 = 0;
    let mut remediations = Vec::new();

    if let Some(cpu) = report.cpu_percent {
        if cpu >= CPU_HIGH_THRESHOLD {
            penalty += CPU_HIGH_PENALTY;
            remediations.push(remediation(
                "High CPU load",
                "Inspect top processes and stop runaway ones",
            ));
        } else if cpu >= CPU_MODERATE_THRESHOLD {
            penalty += CPU_MODERATE_PENALTY;
            remediations.push(remediation("Elevated CPU load", "Review top processes"));
        }
    }

    if let Some(memory) = report.memory_percent {
        if memory >= MEMORY_HIGH_THRESHOLD {
            penalty += MEMORY_HIGH_PENALTY;
            remediations.push(remediation(
                "Critical memory pressure",
                "Restart or stop memory-heavy processes",
            ));
        } else if memory >= MEMORY_MODERATE_THRESHOLD {
            penalty += MEMORY_MODERATE_PENALTY;
            remediations.push(remediation(
                "High memory usage",
                "Review memory-heavy processes",
            ));
        }
    }

    for disk in &report.disks {
        if disk.percent >= DISK_HIGH_THRESHOLD {
            penalty += DISK_HIGH_PENALTY;
            remediations.push(remediation(
                &format!("Disk almost full: {}", disk.mount),
                "Clear temporary files or expand storage",
            ));
        } else if disk.percent >= DISK_MODERATE_THRESHOLD {
            penalty += DISK_MODERATE_PENALTY;
            remediations.push(remediation(
                &format!("Disk filling up: {}", disk.mount),
                "Clear temporary files",
            ));
        }
    }

    if report.network_online == Some(false) {
        penalty += NETWORK_OFFLINE_PENALTY;
        remediations.push(remediation(
            "Network offline",
            "Check connectivity and interface configuration",
        ));
    }

    let score = 100u32.saturating_sub(penalty) as u8;
    (score, remediations)
}

fn remediation(title: &str, action: &str) -> Remediation {
    Remediation {
        title: title.to_string(),
        action: action.to_string(),
    }
}
