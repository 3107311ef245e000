use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pst::processing::{RunningMedian, reduce};
use pst::types::ComputeAction;

fn row(width: usize) -> Vec<f64> {
    // deterministic, unsorted
    (0..width).map(|i| ((i * 7919) % 1009) as f64 * 0.5).collect()
}

fn bench_reducers(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    for width in [8usize, 128, 4096] {
        let values = row(width);
        group.throughput(Throughput::Elements(width as u64));
        for action in [
            ComputeAction::Mean,
            ComputeAction::Variance,
            ComputeAction::Median,
        ] {
            group.bench_with_input(
                BenchmarkId::new(action.name(), width),
                &values,
                |b, values| b.iter(|| reduce(black_box(values), action)),
            );
        }
    }
    group.finish();
}

fn bench_running_median(c: &mut Criterion) {
    let values = row(100_000);
    c.bench_function("running_median_100k", |b| {
        b.iter(|| {
            let mut median = RunningMedian::new();
            median.extend(values.iter().copied());
            black_box(median.value())
        })
    });
}

criterion_group!(benches, bench_reducers, bench_running_median);
criterion_main!(benches);
