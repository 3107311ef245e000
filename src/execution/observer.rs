use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Severity;

/// Execution events emitted by the engine and its extractors.
///
/// Extractor events are emitted from extractor threads, so observers must be `Send + Sync`.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        sources: usize,
    },
    SourceOpened {
        source: String,
    },
    SourceFinished {
        source: String,
        rows_emitted: u64,
    },
    SourceFailed {
        source: String,
        severity: Severity,
        message: String,
    },
    /// The synchronizer saw `source` run out of rows while assembling logical row `row`.
    SourceExhausted {
        source: String,
        row: usize,
    },
    Cancelled,
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::SourceFailed {
                source,
                severity,
                message,
            } => eprintln!("[pst][{severity:?}] source={source} err={message}"),
            ExecutionEvent::RunFinished { elapsed, metrics } => {
                eprintln!("[pst] finished in {elapsed:?}: {metrics}")
            }
            other => eprintln!("[pst] {other:?}"),
        }
    }
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExecutionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ExecutionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ExecutionObserver for CompositeObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Appends execution events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }
}

impl ExecutionObserver for FileObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {event:?}", unix_ts());
        }
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Real-time metrics for a run.
///
/// Extractors and the synchronizer update these counters while running; callers can snapshot
/// them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    rows_read: AtomicU64,
    rows_skipped: AtomicU64,
    rows_merged: AtomicU64,
    sources_finished: AtomicUsize,
    cancelled: AtomicBool,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            rows_read: AtomicU64::new(0),
            rows_skipped: AtomicU64::new(0),
            rows_merged: AtomicU64::new(0),
            sources_finished: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);

        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.rows_read.store(0, Ordering::SeqCst);
        self.rows_skipped.store(0, Ordering::SeqCst);
        self.rows_merged.store(0, Ordering::SeqCst);
        self.sources_finished.store(0, Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_row_read(&self) {
        let _ = self.rows_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_row_skipped(&self) {
        let _ = self.rows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_row_merged(&self) {
        let _ = self.rows_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_source_finished(&self) {
        let _ = self.sources_finished.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            rows_read: self.rows_read.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            rows_merged: self.rows_merged.load(Ordering::Relaxed),
            sources_finished: self.sources_finished.load(Ordering::SeqCst),
            cancelled: self.cancelled.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    /// Lines read and emitted by all extractors.
    pub rows_read: u64,
    /// Lines skipped by the row filter.
    pub rows_skipped: u64,
    /// Output rows handed to the sink.
    pub rows_merged: u64,
    pub sources_finished: usize,
    pub cancelled: bool,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rows_read={}, rows_skipped={}, rows_merged={}, sources_finished={}, cancelled={}, elapsed={:?}",
            self.run_id,
            self.rows_read,
            self.rows_skipped,
            self.rows_merged,
            self.sources_finished,
            self.cancelled,
            self.elapsed
        )
    }
}
