// sysinfo-backed Telemetry implementation

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use sysinfo::{Disks, Networks, Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

use super::{ActionError, Telemetry, platform};
use crate::models::{
    ConnectionInfo, DiskInfo, InterfaceInfo, ProcessInfo, ServiceInfo, SocketInfo,
};

pub struct SystemProbe {
    sys: std::sync::Mutex<System>,
    disks: std::sync::Mutex<Disks>,
    networks: std::sync::Mutex<Networks>,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: std::sync::Mutex::new(sys),
            disks: std::sync::Mutex::new(disks),
            networks: std::sync::Mutex::new(networks),
        }
    }

    fn signal(&self, pid: u32, signal: Signal) -> Result<(), ActionError> {
        let mut sys = self.sys.lock().map_err(|_| ActionError::Unavailable)?;
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
        let process = sys
            .process(Pid::from_u32(pid))
            .ok_or(ActionError::NotFound(pid))?;
        match process.kill_with(signal) {
            Some(true) => Ok(()),
            Some(false) => Err(ActionError::SignalFailed(pid)),
            None => Err(ActionError::Unsupported),
        }
    }
}

impl Telemetry for SystemProbe {
    fn hostname(&self) -> String {
        System::host_name().unwrap_or_else(|| "unknown".into())
    }

    fn platform(&self) -> String {
        System::long_os_version().unwrap_or_else(|| std::env::consts::OS.into())
    }

    fn primary_ipv4(&self) -> Option<String> {
        let mut networks = self.networks.lock().ok()?;
        networks.refresh(true);
        let mut candidates: Vec<(String, String)> = networks
            .list()
            .iter()
            .flat_map(|(name, data)| {
                data.ip_networks()
                    .iter()
                    .filter(|n| n.addr.is_ipv4() && !n.addr.is_loopback())
                    .map(|n| (name.clone(), n.addr.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();
        // Interface-name order keeps the pick stable across scans.
        candidates.sort();
        candidates.into_iter().next().map(|(_, ip)| ip)
    }

    fn cpu_percent(&self, sample: Duration) -> anyhow::Result<f64> {
        {
            let mut sys = self
                .sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_all();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::nothing().with_cpu().with_memory(),
            );
        }
        // Lock released during the sample so concurrent process actions
        // are not held up by the wait.
        std::thread::sleep(sample.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );
        Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
    }

    fn memory_percent(&self) -> anyhow::Result<f64> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
        sys.refresh_memory();
        let total = sys.total_memory();
        let used = total.saturating_sub(sys.available_memory());
        if total == 0 {
            return Ok(0.0);
        }
        Ok((used as f64 / total as f64) * 100.0)
    }

    fn disks(&self) -> anyhow::Result<Vec<DiskInfo>> {
        let mut disks = self
            .disks
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
        disks.refresh(true);
        let infos = disks
            .list()
            .iter()
            .filter(|d| !d.file_system().to_string_lossy().is_empty())
            .map(|d| {
                let total = d.total_space();
                let free = d.available_space();
                let used = total.saturating_sub(free);
                DiskInfo {
                    mount: d.mount_point().to_string_lossy().into_owned(),
                    name: d.name().to_string_lossy().into_owned(),
                    fs_type: d.file_system().to_string_lossy().into_owned(),
                    total_bytes: total,
                    used_bytes: used,
                    free_bytes: free,
                    percent: if total > 0 {
                        (used as f64 / total as f64) * 100.0
                    } else {
                        0.0
                    },
                }
            })
            .collect();
        Ok(infos)
    }

    fn interfaces(&self) -> anyhow::Result<Vec<InterfaceInfo>> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
        networks.refresh(true);
        let mut interfaces: Vec<InterfaceInfo> = networks
            .list()
            .iter()
            .map(|(name, data)| InterfaceInfo {
                name: name.clone(),
                ipv4: data
                    .ip_networks()
                    .iter()
                    .filter(|n| n.addr.is_ipv4())
                    .map(|n| n.addr.to_string())
                    .collect(),
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interfaces)
    }

    fn probe_tcp(&self, addr: &str, timeout: Duration) -> bool {
        let Ok(mut addrs) = addr.to_socket_addrs() else {
            return false;
        };
        addrs.any(|a| TcpStream::connect_timeout(&a, timeout).is_ok())
    }

    fn top_processes(&self, limit: usize) -> anyhow::Result<Vec<ProcessInfo>> {
        // Reads the table warmed by cpu_percent; refreshing here would reset
        // the CPU deltas it accumulated.
        let sys = self
            .sys
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
        let mut processes: Vec<ProcessInfo> = sys
            .processes()
            .values()
            .map(|p| ProcessInfo {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                cpu_percent: p.cpu_usage(),
                memory_bytes: p.memory(),
            })
            .collect();
        processes.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        processes.truncate(limit);
        Ok(processes)
    }

    fn socket_table(&self) -> anyhow::Result<(Vec<SocketInfo>, Vec<ConnectionInfo>)> {
        platform::socket_table()
    }

    fn services(&self) -> anyhow::Result<Vec<ServiceInfo>> {
        if cfg!(target_os = "linux") {
            platform::systemd_services()
        } else {
            let sys = self
                .sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let names: Vec<String> = sys
                .processes()
                .values()
                .map(|p| p.name().to_string_lossy().into_owned())
                .collect();
            Ok(platform::daemon_heuristic(&names))
        }
    }

    fn log_tail(&self, max_lines: usize) -> anyhow::Result<String> {
        platform::log_tail(max_lines)
    }

    fn kill_process(&self, pid: u32) -> Result<(), ActionError> {
        self.signal(pid, Signal::Kill)
    }

    fn suspend_process(&self, pid: u32) -> Result<(), ActionError> {
        self.signal(pid, Signal::Stop)
    }

    fn resume_process(&self, pid: u32) -> Result<(), ActionError> {
        self.signal(pid, Signal::Continue)
    }
}
