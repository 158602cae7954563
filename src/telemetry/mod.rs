// Host telemetry behind a capability trait

mod platform;
mod probe;

pub use probe::SystemProbe;

use std::time::Duration;

use crate::models::{
    ConnectionInfo, DiskInfo, InterfaceInfo, ProcessInfo, ServiceInfo, SocketInfo,
};

/// Failure of a process-control command (kill/suspend/resume).
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("process {0} not found")]
    NotFound(u32),
    #[error("signal delivery to process {0} failed")]
    SignalFailed(u32),
    #[error("signal not supported on this platform")]
    Unsupported,
    #[error("process table unavailable")]
    Unavailable,
}

/// Point-in-time host queries. Implementations block; the scan pipeline calls
/// them from a blocking task, never from the async runtime directly.
pub trait Telemetry: Send + Sync {
    fn hostname(&self) -> String;
    fn platform(&self) -> String;
    /// First non-loopback IPv4, if the host has one.
    fn primary_ipv4(&self) -> Option<String>;
    /// Two-point CPU sample over `sample`. Also accumulates per-process CPU
    /// deltas, so a following `top_processes` reads a warmed table.
    fn cpu_percent(&self, sample: Duration) -> anyhow::Result<f64>;
    fn memory_percent(&self) -> anyhow::Result<f64>;
    fn disks(&self) -> anyhow::Result<Vec<DiskInfo>>;
    fn interfaces(&self) -> anyhow::Result<Vec<InterfaceInfo>>;
    /// True when a TCP connect to `addr` succeeds within `timeout`. Any
    /// failure (resolution, refusal, timeout) is false, never an error.
    fn probe_tcp(&self, addr: &str, timeout: Duration) -> bool;
    fn top_processes(&self, limit: usize) -> anyhow::Result<Vec<ProcessInfo>>;
    fn socket_table(&self) -> anyhow::Result<(Vec<SocketInfo>, Vec<ConnectionInfo>)>;
    fn services(&self) -> anyhow::Result<Vec<ServiceInfo>>;
    /// Last `max_lines` lines of the system log, or a sentinel string when no
    /// known log file exists on this host.
    fn log_tail(&self, max_lines: usize) -> anyhow::Result<String>;
    fn kill_process(&self, pid: u32) -> Result<(), ActionError>;
    fn suspend_process(&self, pid: u32) -> Result<(), ActionError>;
    fn resume_process(&self, pid: u32) -> Result<(), ActionError>;
}
