//! Criterion benchmarks for the end-to-end sales pipeline.

use criterion::{Criterion, criterion_group, criterion_main};

use salesforest_pipeline::{PipelineConfig, TrainTestSplit, synthetic_sales};
use salesforest_rf::RandomForestConfig;

fn bench_pipeline_100_rows(c: &mut Criterion) {
    let dataset = synthetic_sales(100, 7);
    let config = PipelineConfig::new(RandomForestConfig::new(100).unwrap());

    c.bench_function("pipeline_100rows_100trees", |b| {
        b.iter(|| config.run(&dataset).unwrap());
    });
}

fn bench_pipeline_10k_rows(c: &mut Criterion) {
    let dataset = synthetic_sales(10_000, 7);
    let config = PipelineConfig::new(RandomForestConfig::new(100).unwrap());

    c.bench_function("pipeline_10krows_100trees", |b| {
        b.iter(|| config.run(&dataset).unwrap());
    });
}

fn bench_split(c: &mut Criterion) {
    let split = TrainTestSplit::default();

    c.bench_function("split_100k_indices", |b| {
        b.iter(|| split.split(100_000).unwrap());
    });
}

criterion_group!(benches, bench_pipeline_100_rows, bench_pipeline_10k_rows, bench_split);
criterion_main!(benches);
