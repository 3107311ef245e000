use std::io::Cursor;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use pst::config::{PasteConfig, Spec};
use pst::execution::{ExecutionEngine, ExecutionOptions};
use pst::ingestion::SourceInput;
use pst::output::Sink;

const ROWS: usize = 50_000;
const SOURCES: usize = 4;

fn source_text() -> String {
    (0..ROWS)
        .map(|i| format!("{i} {} {} label{i}\n", i * 2, i % 97))
        .collect()
}

fn run_once(text: &str, spec: &Spec) -> usize {
    let config = PasteConfig::from_spec(spec, SOURCES).unwrap();
    let sources = (0..SOURCES)
        .map(|i| SourceInput::reader(format!("src{i}"), Cursor::new(text.to_owned())))
        .collect();
    let mut sink = Sink::new(Vec::with_capacity(ROWS * 64), config.output_sep.clone());
    ExecutionEngine::new(ExecutionOptions::default())
        .run(&config, sources, &mut sink)
        .unwrap();
    sink.into_inner().unwrap().len()
}

fn bench_paste(c: &mut Criterion) {
    let text = source_text();
    let mut group = c.benchmark_group("paste");
    group.throughput(Throughput::Elements((ROWS * SOURCES) as u64));
    group.sample_size(20);

    let raw = Spec {
        input: "0,1".to_string(),
        ..Default::default()
    };
    group.bench_function("raw_columns", |b| b.iter(|| run_once(&text, &raw)));

    let stats = Spec {
        input: "1,2".to_string(),
        compute: "mean,std,median".to_string(),
        ..Default::default()
    };
    group.bench_function("row_statistics", |b| b.iter(|| run_once(&text, &stats)));

    group.finish();
}

criterion_group!(benches, bench_paste);
criterion_main!(benches);
