//! Output formatting.

use std::io::{BufWriter, Write};

use crate::error::PasteResult;

/// Buffered writer for output rows.
///
/// Raw rows are joined with the output separator. Reducer outputs are printed as fixed-point
/// numbers, 15 wide with 15 decimals. Nothing reaches the underlying writer before
/// [`Sink::flush`] unless the buffer fills up.
pub struct Sink<W: Write> {
    out: BufWriter<W>,
    sep: String,
}

impl<W: Write> Sink<W> {
    /// Create a sink writing rows separated by `sep` fields.
    pub fn new(writer: W, sep: impl Into<String>) -> Self {
        Self {
            out: BufWriter::new(writer),
            sep: sep.into(),
        }
    }

    /// Write one raw row.
    pub fn write_fields(&mut self, fields: &[String]) -> PasteResult<()> {
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                self.out.write_all(self.sep.as_bytes())?;
            }
            self.out.write_all(f.as_bytes())?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Write one row of reducer outputs.
    pub fn write_values(&mut self, values: &[f64]) -> PasteResult<()> {
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                self.out.write_all(self.sep.as_bytes())?;
            }
            write!(self.out, "{v:15.15}")?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered rows to the underlying writer.
    pub fn flush(&mut self) -> PasteResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> PasteResult<W> {
        self.out.into_inner().map_err(|e| e.into_error().into())
    }
}
