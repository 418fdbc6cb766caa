//! Criterion benchmarks for salesforest-rf: regression forest training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use salesforest_rf::RandomForestConfig;

fn make_regression(
    n_samples: usize,
    n_features: usize,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<f64>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..n_features).map(|_| rng.r#gen::<f64>()).collect();
        targets.push(row.iter().take(3).sum::<f64>() * 10.0 + rng.r#gen::<f64>());
        features.push(row);
    }
    let names = (0..n_features).map(|f| format!("f{f}")).collect();
    (features, targets, names)
}

fn bench_rf_train(c: &mut Criterion) {
    let (features, targets, names) = make_regression(500, 20, 42);
    let cfg = RandomForestConfig::new(50).unwrap().with_seed(42);

    c.bench_function("rf_train_500x20_50trees", |b| {
        b.iter(|| cfg.fit(&features, &targets, &names).unwrap());
    });
}

fn bench_rf_predict_batch(c: &mut Criterion) {
    let (features, targets, names) = make_regression(500, 20, 42);
    let forest = RandomForestConfig::new(50)
        .unwrap()
        .with_seed(42)
        .fit(&features, &targets, &names)
        .unwrap()
        .into_forest();

    c.bench_function("rf_predict_batch_500x20_50trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    // Proxy for split-finding cost.
    let (features, targets, names) = make_regression(500, 20, 42);
    let cfg = RandomForestConfig::new(1).unwrap().with_seed(42);

    c.bench_function("rf_single_tree_500x20", |b| {
        b.iter(|| cfg.fit(&features, &targets, &names).unwrap());
    });
}

criterion_group!(benches, bench_rf_train, bench_rf_predict_batch, bench_single_tree);
criterion_main!(benches);
