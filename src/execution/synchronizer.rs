//! Lockstep fan-in of extractor channels into merged rows.

use std::io::Write;

use crossbeam_channel::{Receiver, RecvError, TryRecvError, select};

use crate::config::PasteConfig;
use crate::error::{PasteError, PasteResult};
use crate::ingestion::extractor::SourceFailure;
use crate::output::Sink;
use crate::processing::compute_row;
use crate::types::{MergedRow, RaggedPolicy};

use super::{ExecutionEvent, RunHooks};

/// Receiving side of one extractor.
pub(crate) struct SourceLane {
    pub(crate) name: String,
    pub(crate) rows: Receiver<Vec<String>>,
    /// Fields contributed per row; also the placeholder width once the source is exhausted.
    pub(crate) width: usize,
    pub(crate) dead: bool,
}

enum Step {
    Fields(Vec<String>),
    Pad(usize),
    End,
}

/// How a synchronization pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SyncOutcome {
    pub(crate) rows: u64,
    /// Sources still producing when the pass ended; these are cancelled by the engine.
    pub(crate) live_sources: usize,
}

/// The single consumer of a run.
///
/// For every logical row it takes exactly one field vector from each source, in declaration order,
/// while also watching the shared error channel. The merged row and the projected output row are
/// owned buffers refilled for every row.
pub(crate) struct RowSynchronizer<'a> {
    lanes: Vec<SourceLane>,
    errors: Receiver<SourceFailure>,
    pending: Option<PasteError>,
    config: &'a PasteConfig,
    hooks: &'a RunHooks,
    active: usize,
    merged: MergedRow,
    projected: Vec<String>,
}

impl<'a> RowSynchronizer<'a> {
    pub(crate) fn new(
        lanes: Vec<SourceLane>,
        errors: Receiver<SourceFailure>,
        config: &'a PasteConfig,
        hooks: &'a RunHooks,
    ) -> Self {
        let active = lanes.len();
        Self {
            lanes,
            errors,
            pending: None,
            config,
            hooks,
            active,
            merged: MergedRow::with_capacity(config.merged_width()),
            projected: Vec::with_capacity(config.output.len()),
        }
    }

    /// Merge rows into `sink` until the sources are exhausted or an error arrives.
    pub(crate) fn run<W: Write>(mut self, sink: &mut Sink<W>) -> PasteResult<SyncOutcome> {
        let mut written = 0u64;
        let mut row = 0usize;
        loop {
            self.merged.clear();
            for i in 0..self.lanes.len() {
                match self.next_fields(i, row)? {
                    Step::Fields(fields) => self.merged.extend_from_source(fields),
                    Step::Pad(width) => self.merged.pad(width),
                    Step::End => {
                        return Ok(SyncOutcome {
                            rows: written,
                            live_sources: self.active,
                        });
                    }
                }
            }

            let out: &[String] = if self.config.output.is_passthrough() {
                self.merged.fields()
            } else {
                self.config
                    .output
                    .project_into(self.merged.fields(), &mut self.projected);
                &self.projected
            };

            if self.config.compute.is_empty() {
                sink.write_fields(out)?;
            } else {
                let values = compute_row(out, &self.config.compute)?;
                sink.write_values(&values)?;
            }
            written += 1;
            row += 1;
            self.hooks.metrics.on_row_merged();
        }
    }

    /// Wait for source `i`'s contribution to logical row `row`.
    fn next_fields(&mut self, i: usize, row: usize) -> PasteResult<Step> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        if self.lanes[i].dead {
            return Ok(Step::Pad(self.lanes[i].width));
        }

        // rows a source buffered before failing are merged before its error surfaces
        let msg = match self.lanes[i].rows.try_recv() {
            Ok(fields) => Ok(fields),
            Err(TryRecvError::Disconnected) => Err(RecvError),
            Err(TryRecvError::Empty) => select! {
                recv(self.lanes[i].rows) -> msg => msg,
                recv(self.errors) -> err => match err {
                    Ok(failure) => match self.lanes[i].rows.try_recv() {
                        // a row that raced the error is merged, the error surfaces on the next wait
                        Ok(fields) => {
                            self.pending = Some(failure.error);
                            Ok(fields)
                        }
                        Err(_) => return Err(failure.error),
                    },
                    // no error sender left, only data can arrive now
                    Err(_) => self.lanes[i].rows.recv(),
                },
            },
        };

        match msg {
            Ok(fields) => Ok(Step::Fields(fields)),
            Err(_) => {
                // an extractor reports its error before closing its channel
                if let Ok(failure) = self.errors.try_recv() {
                    return Err(failure.error);
                }
                let lane = &mut self.lanes[i];
                lane.dead = true;
                self.active -= 1;
                self.hooks.emit(ExecutionEvent::SourceExhausted {
                    source: lane.name.clone(),
                    row,
                });
                match self.config.ragged {
                    RaggedPolicy::Truncate => Ok(Step::End),
                    RaggedPolicy::Pad if self.active == 0 => Ok(Step::End),
                    RaggedPolicy::Pad => Ok(Step::Pad(lane.width)),
                }
            }
        }
    }
}
