//! Download subsystem seam: fire-and-forget enqueue.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// One download hand-off. `destination_dir` is root-relative, the form the
/// download subsystem expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    pub url: String,
    pub destination_dir: PathBuf,
    pub filename: String,
    pub allow_metered: bool,
    pub allow_roaming: bool,
    pub register_media_index: bool,
    pub description: String,
}

/// Asynchronous download subsystem. Enqueue only; jobs are never polled or
/// awaited by the pipeline.
pub trait Downloader: Send + Sync {
    /// Queues a job and returns its opaque id.
    fn enqueue(&self, job: &DownloadJob) -> Result<u64>;
}

/// Spools jobs as JSON lines for an external download worker to pick up.
pub struct SpoolDownloader {
    spool: PathBuf,
}

impl SpoolDownloader {
    pub fn new(spool: impl Into<PathBuf>) -> Self {
        Self {
            spool: spool.into(),
        }
    }

    /// Spool file under the XDG state dir
    /// (`~/.local/state/dropsink/downloads.jsonl`).
    pub fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("dropsink")?;
        let dir = xdg_dirs.get_state_home();
        fs::create_dir_all(&dir)?;
        Ok(Self::new(dir.join("downloads.jsonl")))
    }
}

impl Downloader for SpoolDownloader {
    fn enqueue(&self, job: &DownloadJob) -> Result<u64> {
        let line = serde_json::to_string(job).context("serialize download job")?;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.spool)
            .with_context(|| format!("open spool {}", self.spool.display()))?;
        writeln!(f, "{line}")?;
        // Job id: byte offset of the record's end, unique per spool file.
        Ok(f.metadata()?.len())
    }
}
