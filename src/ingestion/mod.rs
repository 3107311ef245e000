//! Source reading and per-source column extraction.
//!
//! Every input source is read by its own [`SourceExtractor`], which streams one field vector per
//! selected row to the merge engine. Sources are line-oriented text; fields are split with a
//! [`Separator`].

pub mod extractor;
pub mod split;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{PasteError, PasteResult};

pub use extractor::SourceExtractor;
pub use split::Separator;

/// One input source of a run.
pub enum SourceInput {
    /// A file, opened by the extractor on its own thread.
    Path(PathBuf),
    /// An already-open reader, named for error messages.
    Reader {
        name: String,
        reader: Box<dyn BufRead + Send>,
    },
}

impl SourceInput {
    /// A file source.
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// An in-memory or otherwise pre-opened source.
    pub fn reader(name: impl Into<String>, reader: impl BufRead + Send + 'static) -> Self {
        Self::Reader {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// Name used in events and error messages.
    pub fn name(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Reader { name, .. } => name.clone(),
        }
    }

    /// Open the source for line-by-line reading.
    pub fn open(self) -> PasteResult<Box<dyn BufRead + Send>> {
        match self {
            Self::Path(p) => Ok(Box::new(open_source(&p)?)),
            Self::Reader { reader, .. } => Ok(reader),
        }
    }
}

impl fmt::Debug for SourceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Reader { name, .. } => f.debug_struct("Reader").field("name", name).finish(),
        }
    }
}

/// Open a file source for buffered reading.
pub fn open_source(path: impl AsRef<Path>) -> PasteResult<BufReader<File>> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|error| PasteError::SourceOpen {
            source_name: path.display().to_string(),
            error,
        })
}
