// Compact per-scan summary kept in the bounded history ring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Report;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub score: u8,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disks: Vec<DiskUsageSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsageSummary {
    pub mount: String,
    pub percent: f64,
}

impl HistoryEntry {
    pub fn from_report(report: &Report) -> Self {
        Self {
            timestamp: report.collected_at,
            host: report.host.clone(),
            score: report.score,
            cpu_percent: report.cpu_percent,
            memory_percent: report.memory_percent,
            disks: report
                .disks
                .iter()
                .map(|d| DiskUsageSummary {
                    mount: d.mount.clone(),
                    percent: d.percent,
                })
                .collect(),
        }
    }
}
