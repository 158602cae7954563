// Scan report and its nested telemetry rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScanMode;

/// One completed scan. Immutable once built; identified by host + collection
/// timestamp. Quick scans leave the deep-only fields as `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub host: String,
    pub platform: String,
    /// Primary IPv4, or "unavailable" when no non-loopback address exists.
    pub ip: String,
    pub collected_at: DateTime<Utc>,
    pub mode: ScanMode,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disks: Vec<DiskInfo>,
    pub processes: Vec<ProcessInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub network_online: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listening: Option<Vec<SocketInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub established: Option<Vec<ConnectionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ServiceInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_snippet: Option<String>,
    pub score: u8,
    pub remediations: Vec<Remediation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub mount: String,
    pub name: String,
    pub fs_type: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceInfo {
    pub name: String,
    pub ipv4: Vec<String>,
}

/// Listening endpoint from the socket table (deep scans only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketInfo {
    pub pid: Option<u32>,
    pub process: Option<String>,
    pub local_addr: String,
}

/// Established connection from the socket table (deep scans only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub pid: Option<u32>,
    pub process: Option<String>,
    pub local_addr: String,
    pub remote_addr: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub description: String,
}

/// Suggested operator action attached by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    pub title: String,
    pub action: String,
}
