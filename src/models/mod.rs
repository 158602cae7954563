// Domain models shared by the scan pipeline, store and HTTP layer

mod history;
mod report;
mod run;

pub use history::{DiskUsageSummary, HistoryEntry};
pub use report::{
    ConnectionInfo, DiskInfo, InterfaceInfo, ProcessInfo, Remediation, Report, ServiceInfo,
    SocketInfo,
};
pub use run::{RunState, ScanMode};
