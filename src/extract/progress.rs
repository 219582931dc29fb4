use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::ExtractionSummary;

/// Observer interface for extraction progress.
///
/// Push-only: the extractor never consumes a return value, blocks on the
/// observer, or changes behavior based on it. Counters arrive once per
/// completed window, so a caller can implement its own timeout/abort policy
/// externally.
pub trait ProgressObserver: Send + Sync {
    /// Called after each completed window.
    fn on_progress(&self, _rows_seen: u64, _chunks_done: u64) {}

    /// Called once after the table is frozen, with the final summary.
    fn on_finished(&self, _summary: &ExtractionSummary) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeProgress {
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl CompositeProgress {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ProgressObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeProgress")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ProgressObserver for CompositeProgress {
    fn on_progress(&self, rows_seen: u64, chunks_done: u64) {
        for o in &self.observers {
            o.on_progress(rows_seen, chunks_done);
        }
    }

    fn on_finished(&self, summary: &ExtractionSummary) {
        for o in &self.observers {
            o.on_finished(summary);
        }
    }
}

/// Logs progress to stderr.
#[derive(Debug, Default)]
pub struct StdErrProgress;

impl ProgressObserver for StdErrProgress {
    fn on_progress(&self, rows_seen: u64, chunks_done: u64) {
        eprintln!("[extract] rows={rows_seen} chunks={chunks_done}");
    }

    fn on_finished(&self, summary: &ExtractionSummary) {
        eprintln!(
            "[extract][done] rows={} skipped={} filtered={} records={}",
            summary.row_count_seen,
            summary.row_count_skipped,
            summary.row_count_filtered,
            summary.record_count
        );
    }
}

/// Appends progress events to a local log file.
#[derive(Debug)]
pub struct FileProgress {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileProgress {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ProgressObserver for FileProgress {
    fn on_progress(&self, rows_seen: u64, chunks_done: u64) {
        self.append_line(&format!(
            "{} progress rows={rows_seen} chunks={chunks_done}",
            unix_ts()
        ));
    }

    fn on_finished(&self, summary: &ExtractionSummary) {
        self.append_line(&format!(
            "{} done rows={} skipped={} filtered={} records={}",
            unix_ts(),
            summary.row_count_seen,
            summary.row_count_skipped,
            summary.row_count_filtered,
            summary.record_count
        ));
    }
}

pub(crate) fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
