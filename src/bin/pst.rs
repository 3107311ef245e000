//! `pst`: paste selected columns of several text files side by side.

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use pst::PasteResult;
use pst::config::{PasteConfig, Spec};
use pst::error::PasteError;
use pst::execution::{ExecutionEngine, ExecutionOptions, StdErrExecutionObserver};
use pst::ingestion::SourceInput;
use pst::output::Sink;

const AFTER_HELP: &str = "\
Notes:
  Column, row and output specs are comma-separated lists of 0-based indices
  or inclusive ranges (e.g. 0,2-4). Input specs for different files are
  separated by '|'; the last one is reused for any remaining files. Without
  an input spec every file contributes its whole line.

  Output stops at the shortest file unless --pad is given, in which case
  exhausted files contribute empty fields until every file is done.

  Compute actions: mean, var, std, min, max, median. They reduce every
  merged row to one number each, printed with 15 decimals.

Examples:
  pst -i 0,1 a.txt b.txt            columns 0 and 1 of both files
  pst -i '0|2-3' -o 2,0 a.txt b.txt  reorder the merged columns
  pst -i 1 -c mean,std 'runs/*.dat' per-row statistics over many files
  pst -r 0-9 -s ';' a.csv b.csv      first ten rows, ';'-separated";

/// Extract columns from column-oriented text files and paste them row by row.
#[derive(Parser)]
#[command(name = "pst", version, after_help = AFTER_HELP)]
struct Cli {
    /// Input files (glob patterns are expanded)
    #[arg(required = true)]
    files: Vec<String>,

    /// Input column spec, one entry per file separated by '|'
    #[arg(short, long)]
    input: Option<String>,

    /// Output column order over the merged row
    #[arg(short, long)]
    output: Option<String>,

    /// Input separator characters (default: whitespace)
    #[arg(short = 's', long = "input-sep")]
    input_sep: Option<String>,

    /// Output separator (default: a single space)
    #[arg(short = 't', long = "output-sep")]
    output_sep: Option<String>,

    /// Compute actions applied to every merged row
    #[arg(short, long)]
    compute: Option<String>,

    /// Rows to process
    #[arg(short, long)]
    rows: Option<String>,

    /// Extractor threads (at least one per file is always used)
    #[arg(short = 'n', long)]
    threads: Option<usize>,

    /// Pad exhausted files with empty fields instead of stopping at the shortest
    #[arg(long)]
    pad: bool,

    /// Read defaults from a JSON spec file; flags override its fields
    #[arg(long)]
    spec_file: Option<PathBuf>,

    /// Log execution events and metrics on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn spec(&self) -> PasteResult<Spec> {
        let mut spec = match &self.spec_file {
            Some(path) => Spec::from_json_path(path)?,
            None => Spec::default(),
        };
        let overrides = [
            (&self.input, &mut spec.input),
            (&self.output, &mut spec.output),
            (&self.input_sep, &mut spec.input_sep),
            (&self.output_sep, &mut spec.output_sep),
            (&self.compute, &mut spec.compute),
            (&self.rows, &mut spec.rows),
        ];
        for (flag, field) in overrides {
            if let Some(v) = flag {
                *field = v.clone();
            }
        }
        spec.pad |= self.pad;
        Ok(spec)
    }
}

/// Expand glob patterns; arguments without matches are kept so opening them reports the error.
fn expand_inputs(args: &[String]) -> PasteResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(args.len());
    for arg in args {
        let matches = glob::glob(arg)
            .map_err(|e| PasteError::config(format!("invalid file pattern '{arg}': {e}")))?;
        let before = paths.len();
        for entry in matches {
            paths.push(entry.map_err(|e| PasteError::Io(e.into()))?);
        }
        if paths.len() == before {
            paths.push(PathBuf::from(arg));
        }
    }
    Ok(paths)
}

fn run(cli: &Cli) -> PasteResult<()> {
    let spec = cli.spec()?;
    let paths = expand_inputs(&cli.files)?;
    let config = PasteConfig::from_spec(&spec, paths.len())?;

    let mut engine = ExecutionEngine::new(ExecutionOptions {
        num_threads: cli.threads.filter(|&n| n > 0),
        ..Default::default()
    });
    if cli.verbose {
        engine = engine.with_observer(Arc::new(StdErrExecutionObserver));
        eprintln!("Files:  {}", paths.len());
        eprintln!("Output: {} columns", config.merged_width());
    }

    let sources = paths.into_iter().map(SourceInput::Path).collect();
    let mut sink = Sink::new(io::stdout().lock(), config.output_sep.clone());
    engine.run(&config, sources, &mut sink)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("pst: {e}");
        process::exit(1);
    }
}
