use std::time::Duration;

use serde::Deserialize;

use crate::scan::ScanOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub forwarder: Option<ForwarderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding per-scan reports, latest.json and history.json.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// CPU sampling window; the dominant part of scan latency.
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Lines of system log captured by deep scans.
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Max log lines buffered per /stream subscriber (slow clients may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
    #[serde(default = "default_keepalive_ms")]
    pub keepalive_ms: u64,
}

/// Optional push of completed reports to a central aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    pub endpoint: String,
    pub api_token: String,
    #[serde(default = "default_forward_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cpu_sample_ms() -> u64 {
    1000
}

fn default_probe_addr() -> String {
    "8.8.8.8:53".into()
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_log_tail_lines() -> usize {
    250
}

fn default_broadcast_capacity() -> usize {
    256
}

fn default_keepalive_ms() -> u64 {
    500
}

fn default_forward_timeout_ms() -> u64 {
    5000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cpu_sample_ms: default_cpu_sample_ms(),
            probe_addr: default_probe_addr(),
            probe_timeout_ms: default_probe_timeout_ms(),
            log_tail_lines: default_log_tail_lines(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
            keepalive_ms: default_keepalive_ms(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.storage.data_dir.is_empty(),
            "storage.data_dir must be non-empty"
        );
        anyhow::ensure!(
            self.scan.cpu_sample_ms > 0,
            "scan.cpu_sample_ms must be > 0, got {}",
            self.scan.cpu_sample_ms
        );
        anyhow::ensure!(
            !self.scan.probe_addr.is_empty(),
            "scan.probe_addr must be non-empty"
        );
        anyhow::ensure!(
            self.scan.probe_timeout_ms > 0,
            "scan.probe_timeout_ms must be > 0, got {}",
            self.scan.probe_timeout_ms
        );
        anyhow::ensure!(
            self.scan.log_tail_lines > 0,
            "scan.log_tail_lines must be > 0, got {}",
            self.scan.log_tail_lines
        );
        anyhow::ensure!(
            self.stream.broadcast_capacity > 0,
            "stream.broadcast_capacity must be > 0, got {}",
            self.stream.broadcast_capacity
        );
        anyhow::ensure!(
            self.stream.keepalive_ms > 0,
            "stream.keepalive_ms must be > 0, got {}",
            self.stream.keepalive_ms
        );
        if let Some(forwarder) = &self.forwarder {
            anyhow::ensure!(
                !forwarder.endpoint.is_empty(),
                "forwarder.endpoint must be non-empty"
            );
            anyhow::ensure!(
                !forwarder.api_token.is_empty(),
                "forwarder.api_token must be non-empty"
            );
            anyhow::ensure!(
                forwarder.timeout_ms > 0,
                "forwarder.timeout_ms must be > 0, got {}",
                forwarder.timeout_ms
            );
        }
        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            cpu_sample: Duration::from_millis(self.scan.cpu_sample_ms),
            probe_addr: self.scan.probe_addr.clone(),
            probe_timeout: Duration::from_millis(self.scan.probe_timeout_ms),
            log_tail_lines: self.scan.log_tail_lines,
        }
    }
}
