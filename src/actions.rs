// Remedial host actions invoked over HTTP

use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Files younger than this survive a temp sweep; they may still be in use.
const TEMP_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStats {
    pub removed: u64,
    pub bytes_freed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostMode {
    Soft,
    Hard,
}

/// What a boost actually did. `detail` carries the note when the hard part
/// could not run and the boost degraded to soft.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostOutcome {
    pub mode: BoostMode,
    pub cleanup: CleanupStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Delete stale regular files from the OS temp directory.
pub async fn clear_temp() -> anyhow::Result<CleanupStats> {
    tokio::task::spawn_blocking(|| sweep_temp(&std::env::temp_dir(), TEMP_MAX_AGE))
        .await
        .map_err(|e| anyhow::anyhow!("cleanup task join: {}", e))?
}

/// Soft: sweep stale temp files. Hard: additionally drop the kernel page
/// cache, which needs a Linux host and root.
pub async fn boost(mode: BoostMode) -> anyhow::Result<BoostOutcome> {
    let cleanup = clear_temp().await?;
    let detail = match mode {
        BoostMode::Soft => None,
        BoostMode::Hard => tokio::task::spawn_blocking(drop_page_cache)
            .await
            .map_err(|e| anyhow::anyhow!("cleanup task join: {}", e))?,
    };
    Ok(BoostOutcome {
        mode,
        cleanup,
        detail,
    })
}

/// Remove regular files at least `max_age` old. Per-entry failures are
/// skipped; the sweep itself only fails when the directory is unreadable.
pub fn sweep_temp(dir: &Path, max_age: Duration) -> anyhow::Result<CleanupStats> {
    let mut stats = CleanupStats::default();
    let now = SystemTime::now();
    for entry in std::fs::read_dir(dir).context("reading temp dir")? {
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let stale = meta
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .is_some_and(|age| age >= max_age);
        if !stale {
            continue;
        }
        let len = meta.len();
        if std::fs::remove_file(entry.path()).is_ok() {
            stats.removed += 1;
            stats.bytes_freed += len;
        }
    }
    Ok(stats)
}

/// Returns the degradation note when the cache drop did not happen.
fn drop_page_cache() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        // sync first so dropping caches cannot discard dirty pages.
        if let Err(e) = std::process::Command::new("sync").status() {
            return Some(format!("sync failed, page cache kept: {}", e));
        }
        match std::fs::write("/proc/sys/vm/drop_caches", "3") {
            Ok(()) => None,
            Err(e) => Some(format!("page cache not dropped: {}", e)),
        }
    }
    #[cfg(not(target_os = "linux"))]
    Some("page cache drop unavailable on this platform; ran soft boost".into())
}
