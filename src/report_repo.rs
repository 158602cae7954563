// File-backed report store: one JSON file per scan, a latest pointer and a
// bounded history ring. Every write is temp-file + rename so readers never
// observe a half-written file.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Context;
use bytes::Bytes;
use tracing::instrument;

use crate::models::{HistoryEntry, Report};

/// Scans kept in the history ring; the oldest entry is evicted on overflow.
pub const HISTORY_CAPACITY: usize = 8;

const LATEST_FILE: &str = "latest.json";
const HISTORY_FILE: &str = "history.json";

pub struct ReportRepo {
    dir: PathBuf,
    latest: Arc<RwLock<Option<Report>>>,
    history: Arc<Mutex<VecDeque<HistoryEntry>>>,
}

impl ReportRepo {
    /// Open (or create) the data directory and reload whatever a previous
    /// run left behind. Unreadable files are discarded, not fatal.
    pub fn open(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating data dir {}", dir.display()))?;

        let latest = match std::fs::read(dir.join(LATEST_FILE)) {
            Ok(bytes) => match serde_json::from_slice::<Report>(&bytes) {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        operation = "load_latest",
                        "discarding unreadable latest report"
                    );
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e).context("reading latest report"),
        };

        let mut history: VecDeque<HistoryEntry> = match std::fs::read(dir.join(HISTORY_FILE)) {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(entries) => entries.into(),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        operation = "load_history",
                        "discarding unreadable history"
                    );
                    VecDeque::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => return Err(e).context("reading history"),
        };
        while history.len() > HISTORY_CAPACITY {
            history.pop_front();
        }

        Ok(Self {
            dir,
            latest: Arc::new(RwLock::new(latest)),
            history: Arc::new(Mutex::new(history)),
        })
    }

    /// Persist a completed report under its own id and overwrite the latest
    /// pointer. Returns the id the report can be downloaded under.
    #[instrument(skip(self, report), fields(repo = "report", operation = "save_report"))]
    pub async fn save_report(&self, report: &Report) -> anyhow::Result<String> {
        let id = report_id(report);
        let bytes = serde_json::to_vec_pretty(report).context("serializing report")?;
        let report_path = self.dir.join(format!("{}.json", id));
        let latest_path = self.dir.join(LATEST_FILE);
        let written = report.clone();

        tokio::task::spawn_blocking(move || {
            write_atomic(&report_path, &bytes)?;
            write_atomic(&latest_path, &bytes)
        })
        .await
        .map_err(|e| anyhow::anyhow!("report store task join: {}", e))??;

        if let Ok(mut guard) = self.latest.write() {
            *guard = Some(written);
        }
        Ok(id)
    }

    /// Most recent report, if any scan has completed (or survives on disk
    /// from a previous run).
    pub fn latest(&self) -> Option<Report> {
        self.latest.read().ok()?.clone()
    }

    /// Append to the ring and persist it. The 9th entry evicts the oldest.
    #[instrument(skip(self, entry), fields(repo = "report", operation = "append_history"))]
    pub async fn append_history(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        let snapshot: Vec<HistoryEntry> = {
            let mut history = self
                .history
                .lock()
                .map_err(|e| anyhow::anyhow!("history lock poisoned: {}", e))?;
            history.push_back(entry);
            while history.len() > HISTORY_CAPACITY {
                history.pop_front();
            }
            history.iter().cloned().collect()
        };

        let bytes = serde_json::to_vec_pretty(&snapshot).context("serializing history")?;
        let path = self.dir.join(HISTORY_FILE);
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| anyhow::anyhow!("report store task join: {}", e))?
    }

    /// Oldest first, most recent last.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .lock()
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Ids of every persisted per-scan file, sorted ascending.
    #[instrument(skip(self), fields(repo = "report", operation = "list_report_ids"))]
    pub async fn list_report_ids(&self) -> anyhow::Result<Vec<String>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let mut ids = Vec::new();
            for entry in std::fs::read_dir(&dir).context("listing data dir")? {
                let entry = entry.context("listing data dir")?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if name == LATEST_FILE || name == HISTORY_FILE {
                    continue;
                }
                if let Some(id) = name.strip_suffix(".json") {
                    ids.push(id.to_string());
                }
            }
            ids.sort();
            Ok(ids)
        })
        .await
        .map_err(|e| anyhow::anyhow!("report store task join: {}", e))?
    }

    /// Raw bytes of one persisted report, or None when the id is unknown.
    /// Callers must validate the id first; see [`valid_report_id`].
    #[instrument(skip(self), fields(repo = "report", operation = "read_report"))]
    pub async fn read_report_bytes(&self, id: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.dir.join(format!("{}.json", id));
        tokio::task::spawn_blocking(move || match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        })
        .await
        .map_err(|e| anyhow::anyhow!("report store task join: {}", e))?
    }
}

/// Report ids travel in URLs and become file names; anything resembling a
/// path component is rejected before it reaches the filesystem.
pub fn valid_report_id(id: &str) -> bool {
    !id.is_empty()
        && !id.contains("..")
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// `{host}-{yyyymmddHHMMSS}`, with the host reduced to filename-safe chars.
pub fn report_id(report: &Report) -> String {
    let mut host: String = report
        .host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if host.is_empty() {
        host.push_str("host");
    }
    format!("{}-{}", host, report.collected_at.format("%Y%m%d%H%M%S"))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
