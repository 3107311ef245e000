//! Execution engine: runs one extractor per source and merges their rows in lockstep.
//!
//! This module sits "above" [`crate::ingestion`] and [`crate::processing`] and provides:
//!
//! - a dedicated thread pool running one [`crate::ingestion::SourceExtractor`] per source
//! - bounded per-source channels (backpressure) and a shared error channel
//! - the row synchronizer, cancellation, and real-time metrics + observer hooks
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use pst::config::{PasteConfig, Spec};
//! use pst::execution::{ExecutionEngine, ExecutionOptions};
//! use pst::ingestion::SourceInput;
//! use pst::output::Sink;
//!
//! let spec = Spec { input: "0".to_string(), ..Default::default() };
//! let config = PasteConfig::from_spec(&spec, 2).unwrap();
//! let sources = vec![
//!     SourceInput::reader("left", Cursor::new("a 1\nb 2\n")),
//!     SourceInput::reader("right", Cursor::new("x 9\ny 8\n")),
//! ];
//!
//! let mut sink = Sink::new(Vec::new(), " ");
//! ExecutionEngine::new(ExecutionOptions::default())
//!     .run(&config, sources, &mut sink)
//!     .unwrap();
//! let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
//! assert_eq!(out, "a x\nb y\n");
//! ```

mod observer;
mod synchronizer;

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::bounded;
use rayon::ThreadPoolBuilder;

use crate::config::PasteConfig;
use crate::error::{PasteError, PasteResult};
use crate::ingestion::extractor::SourceFailure;
use crate::ingestion::{SourceExtractor, SourceInput};
use crate::output::Sink;

pub use observer::{
    CompositeObserver, ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    FileObserver, StdErrExecutionObserver,
};

use synchronizer::{RowSynchronizer, SourceLane};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of extractor threads.
    ///
    /// Every extractor may block on a full channel, so the pool always gets at least one thread
    /// per source; larger values only add idle threads. `None` means one per source.
    pub num_threads: Option<usize>,
    /// Rows buffered per source before its extractor blocks.
    ///
    /// Bounds how far a fast source can run ahead of a slow one while still overlapping I/O with
    /// merging.
    pub channel_capacity: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            num_threads: None,
            channel_capacity: 10_000,
        }
    }
}

/// Observer and metrics shared by the synchronizer and every extractor of a run.
#[derive(Default)]
pub(crate) struct RunHooks {
    pub(crate) observer: Option<Arc<dyn ExecutionObserver>>,
    pub(crate) metrics: Arc<ExecutionMetrics>,
}

impl RunHooks {
    pub(crate) fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Runs paste jobs: N concurrent extractors feeding one synchronizer.
pub struct ExecutionEngine {
    opts: ExecutionOptions,
    hooks: RunHooks,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `channel_capacity == 0` or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(opts.channel_capacity > 0, "channel_capacity must be > 0");
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }
        Self {
            opts,
            hooks: RunHooks::default(),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.hooks.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.hooks.metrics)
    }

    /// Extract, merge and write every row of `sources` to `sink`.
    ///
    /// Sources are merged in the order given; `config` must have been built for
    /// `sources.len()` sources. The sink is flushed before returning, also when the run fails, so
    /// rows written before an error are kept.
    pub fn run<W: Write>(
        &self,
        config: &PasteConfig,
        sources: Vec<SourceInput>,
        sink: &mut Sink<W>,
    ) -> PasteResult<()> {
        if sources.len() != config.num_sources() {
            return Err(PasteError::config(format!(
                "configuration covers {} sources but {} were given",
                config.num_sources(),
                sources.len()
            )));
        }

        let start = Instant::now();
        let metrics = &self.hooks.metrics;
        metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            sources: sources.len(),
        });

        let result = self.merge(config, sources, sink);
        let flushed = sink.flush();

        metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: metrics.snapshot(),
        });

        result.and(flushed)
    }

    fn merge<W: Write>(
        &self,
        config: &PasteConfig,
        sources: Vec<SourceInput>,
        sink: &mut Sink<W>,
    ) -> PasteResult<()> {
        let n = sources.len();
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.opts.num_threads.unwrap_or(n).max(n))
            .thread_name(|i| format!("pst-extract-{i}"))
            .build()
            .map_err(std::io::Error::other)?;

        // each extractor reports at most one error
        let (err_tx, err_rx) = bounded::<SourceFailure>(n);
        // never sent on; dropping the sender cancels every extractor
        let (done_tx, done_rx) = bounded::<()>(0);

        let outcome = pool.in_place_scope(|scope| {
            let mut lanes = Vec::with_capacity(n);
            for (i, input) in sources.into_iter().enumerate() {
                let (data_tx, data_rx) = bounded(self.opts.channel_capacity);
                let name = input.name();
                let extractor = SourceExtractor::new(
                    name.clone(),
                    &config.columns[i],
                    &config.rows,
                    &config.separator,
                    data_tx,
                    done_rx.clone(),
                    err_tx.clone(),
                    &self.hooks,
                );
                scope.spawn(move |_| extractor.run(input));
                lanes.push(SourceLane {
                    name,
                    rows: data_rx,
                    width: config.columns[i].width(),
                    dead: false,
                });
            }

            let result =
                RowSynchronizer::new(lanes, err_rx.clone(), config, &self.hooks).run(sink);

            let cancelled = match &result {
                Ok(outcome) => outcome.live_sources > 0,
                Err(_) => true,
            };
            drop(done_tx);
            if cancelled {
                self.hooks.metrics.on_cancel();
                self.emit(ExecutionEvent::Cancelled);
            }
            // the scope joins every extractor before returning
            result
        })?;

        // A source can fail after the synchronizer stopped waiting on it. A failure at or before
        // the row where the run stopped fails the run, whatever the source order; later failures
        // only concern rows that were never going to be written.
        while let Ok(failure) = err_rx.try_recv() {
            if failure.rows_emitted <= outcome.rows {
                return Err(failure.error);
            }
        }
        Ok(())
    }

    fn emit(&self, event: ExecutionEvent) {
        self.hooks.emit(event);
    }
}

/// Paste the files at `paths` into `writer` with the default engine.
pub fn paste_files<P, W>(config: &PasteConfig, paths: &[P], writer: W) -> PasteResult<W>
where
    P: AsRef<std::path::Path>,
    W: Write,
{
    let sources = paths.iter().map(SourceInput::path).collect();
    let mut sink = Sink::new(writer, config.output_sep.clone());
    ExecutionEngine::new(ExecutionOptions::default()).run(config, sources, &mut sink)?;
    sink.into_inner()
}
