//! Per-source column extraction.

use std::io::BufRead;

use crossbeam_channel::{Receiver, Sender, select};

use crate::error::{PasteError, PasteResult};
use crate::execution::{ExecutionEvent, RunHooks};
use crate::processing::RowFilter;
use crate::types::ColumnSpec;

use super::{Separator, SourceInput};

/// An extractor error and the number of rows its source delivered before failing.
#[derive(Debug)]
pub(crate) struct SourceFailure {
    pub(crate) error: PasteError,
    pub(crate) rows_emitted: u64,
}

/// Reads one source end to end and streams the selected columns of every selected row.
///
/// The extractor owns the sending half of its data channel; dropping it (on exhaustion, error or
/// cancellation) tells the synchronizer that no more rows follow. At most one error is reported,
/// always before the data channel closes.
///
/// Lines are split on `\n` (a trailing `\r` is dropped) and decoded lossily, so bytes that are not
/// valid UTF-8 never fail a source.
pub struct SourceExtractor<'a> {
    name: String,
    columns: &'a ColumnSpec,
    rows: &'a RowFilter,
    separator: &'a Separator,
    data: Sender<Vec<String>>,
    done: Receiver<()>,
    errors: Sender<SourceFailure>,
    hooks: &'a RunHooks,
}

impl<'a> SourceExtractor<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        columns: &'a ColumnSpec,
        rows: &'a RowFilter,
        separator: &'a Separator,
        data: Sender<Vec<String>>,
        done: Receiver<()>,
        errors: Sender<SourceFailure>,
        hooks: &'a RunHooks,
    ) -> Self {
        Self {
            name,
            columns,
            rows,
            separator,
            data,
            done,
            errors,
            hooks,
        }
    }

    /// Open `input` and stream its rows until exhaustion, error or cancellation.
    pub fn run(self, input: SourceInput) {
        let mut reader = match input.open() {
            Ok(r) => r,
            Err(e) => return self.fail(e, 0),
        };
        self.hooks.emit(ExecutionEvent::SourceOpened {
            source: self.name.clone(),
        });

        let max_row = self.rows.max_entry();
        let mut emitted = 0u64;
        let mut buf = Vec::new();
        for row in 0usize.. {
            if row > max_row {
                break;
            }
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(error) => {
                    let err = PasteError::SourceScan {
                        source_name: self.name.clone(),
                        error,
                    };
                    return self.fail(err, emitted);
                }
            }
            if !self.rows.contains(row) {
                self.hooks.metrics.on_row_skipped();
                continue;
            }

            let line = String::from_utf8_lossy(strip_line_ending(&buf));
            let fields = match self.extract(&line, row) {
                Ok(f) => f,
                Err(e) => return self.fail(e, emitted),
            };

            select! {
                send(self.data, fields) -> res => {
                    // the synchronizer dropped its receiver: the run is over
                    if res.is_err() {
                        return;
                    }
                }
                recv(self.done) -> _ => return,
            }
            emitted += 1;
            self.hooks.metrics.on_row_read();
        }

        self.hooks.metrics.on_source_finished();
        self.hooks.emit(ExecutionEvent::SourceFinished {
            source: self.name.clone(),
            rows_emitted: emitted,
        });
    }

    /// Build the field vector for one line.
    fn extract(&self, line: &str, row: usize) -> PasteResult<Vec<String>> {
        let line = line.trim();
        if self.columns.is_whole_line() {
            return Ok(vec![line.to_string()]);
        }

        let items = self.separator.split(line);
        self.columns
            .iter()
            .map(|&c| {
                items
                    .get(c)
                    .map(|s| s.to_string())
                    .ok_or_else(|| PasteError::ColumnOutOfRange {
                        source_name: self.name.clone(),
                        column: c,
                        row,
                    })
            })
            .collect()
    }

    fn fail(self, error: PasteError, rows_emitted: u64) {
        self.hooks.emit(ExecutionEvent::SourceFailed {
            source: self.name.clone(),
            severity: error.severity(),
            message: error.to_string(),
        });
        // capacity covers one error per source, so this never blocks
        let _ = self.errors.send(SourceFailure {
            error,
            rows_emitted,
        });
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use crossbeam_channel::bounded;

    use super::{SourceExtractor, SourceFailure};
    use crate::error::PasteError;
    use crate::execution::{ExecutionEvent, ExecutionObserver, RunHooks};
    use crate::ingestion::{Separator, SourceInput};
    use crate::processing::{RowFilter, RowRange};
    use crate::types::ColumnSpec;

    fn run_extractor(
        bytes: &'static [u8],
        columns: ColumnSpec,
        rows: RowFilter,
        separator: Separator,
    ) -> (Vec<Vec<String>>, Option<SourceFailure>) {
        let hooks = RunHooks::default();
        let (data_tx, data_rx) = bounded(64);
        let (_done_tx, done_rx) = bounded::<()>(0);
        let (err_tx, err_rx) = bounded(1);

        SourceExtractor::new(
            "mem".to_string(),
            &columns,
            &rows,
            &separator,
            data_tx,
            done_rx,
            err_tx,
            &hooks,
        )
        .run(SourceInput::reader("mem", Cursor::new(bytes)));

        (data_rx.iter().collect(), err_rx.try_recv().ok())
    }

    #[test]
    fn extracts_columns_in_spec_order() {
        let (rows, err) = run_extractor(
            b"a b c\nd e f\n",
            ColumnSpec::new(vec![2, 0, 0]),
            RowFilter::all(),
            Separator::Whitespace,
        );
        assert!(err.is_none());
        assert_eq!(rows, vec![vec!["c", "a", "a"], vec!["f", "d", "d"]]);
    }

    #[test]
    fn whole_line_spec_emits_trimmed_line() {
        let (rows, _) = run_extractor(
            b"  a  b \n",
            ColumnSpec::whole_line(),
            RowFilter::all(),
            Separator::Whitespace,
        );
        assert_eq!(rows, vec![vec!["a  b"]]);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let (rows, err) = run_extractor(
            b"1 caf\xe9\n2 x\n3 \xff\xfe",
            ColumnSpec::new(vec![0]),
            RowFilter::all(),
            Separator::Whitespace,
        );
        assert!(err.is_none());
        assert_eq!(rows, vec![vec!["1"], vec!["2"], vec!["3"]]);

        let (rows, _) = run_extractor(
            b"caf\xe9\n",
            ColumnSpec::whole_line(),
            RowFilter::all(),
            Separator::Whitespace,
        );
        assert_eq!(rows, vec![vec!["caf\u{FFFD}"]]);
    }

    #[test]
    fn crlf_endings_are_stripped() {
        let (rows, _) = run_extractor(
            b"1;2\r\n3;4\r\n",
            ColumnSpec::new(vec![1]),
            RowFilter::all(),
            Separator::from_chars(";"),
        );
        assert_eq!(rows, vec![vec!["2"], vec!["4"]]);
    }

    #[test]
    fn row_filter_skips_and_stops_early() {
        let (rows, _) = run_extractor(
            b"0\n1\n2\n3\n4\n5\n",
            ColumnSpec::new(vec![0]),
            RowFilter::new(vec![RowRange::new(3, 4), RowRange::new(1, 1)]),
            Separator::Whitespace,
        );
        assert_eq!(rows, vec![vec!["1"], vec!["3"], vec!["4"]]);
    }

    #[test]
    fn missing_column_reports_error_and_closes() {
        let (rows, failure) = run_extractor(
            b"1;2;3\n4;5\n6;7;8\n",
            ColumnSpec::new(vec![2]),
            RowFilter::all(),
            Separator::from_chars(";"),
        );
        assert_eq!(rows, vec![vec!["3"]]);
        let failure = failure.unwrap();
        assert_eq!(failure.rows_emitted, 1);
        match failure.error {
            PasteError::ColumnOutOfRange {
                source_name,
                column,
                row,
            } => {
                assert_eq!(source_name, "mem");
                assert_eq!(column, 2);
                assert_eq!(row, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[derive(Default)]
    struct Finished {
        sources: Mutex<Vec<String>>,
    }

    impl ExecutionObserver for Finished {
        fn on_event(&self, event: &ExecutionEvent) {
            if let ExecutionEvent::SourceFinished { source, .. } = event {
                self.sources.lock().unwrap().push(source.clone());
            }
        }
    }

    #[test]
    fn cancellation_abandons_pending_rows() {
        let finished = Arc::new(Finished::default());
        let hooks = RunHooks {
            observer: Some(finished.clone() as Arc<dyn ExecutionObserver>),
            ..Default::default()
        };
        let columns = ColumnSpec::new(vec![0]);
        let rows = RowFilter::all();
        let separator = Separator::Whitespace;
        // rendezvous channel nobody reads from: only cancellation can unblock a send
        let (data_tx, data_rx) = bounded(0);
        let (done_tx, done_rx) = bounded::<()>(0);
        let (err_tx, err_rx) = bounded(1);
        drop(done_tx);

        SourceExtractor::new(
            "mem".to_string(),
            &columns,
            &rows,
            &separator,
            data_tx,
            done_rx,
            err_tx,
            &hooks,
        )
        .run(SourceInput::reader("mem", Cursor::new("a\nb\nc\n")));

        assert!(data_rx.try_recv().is_err());
        assert!(err_rx.try_recv().is_err());
        let snap = hooks.metrics.snapshot();
        assert_eq!(snap.rows_read, 0);
        assert_eq!(snap.sources_finished, 0);
        assert!(finished.sources.lock().unwrap().is_empty());
    }
}
