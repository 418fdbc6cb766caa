//! End-to-end: synthetic sales table -> split -> forest -> held-out MSE.

use std::collections::HashSet;

use salesforest_pipeline::{
    PipelineConfig, PipelineError, SalesDataset, TestSize, TrainTestSplit, mean_squared_error,
    synthetic_sales,
};
use salesforest_rf::RandomForestConfig;

fn hundred_row_config() -> PipelineConfig {
    PipelineConfig::new(RandomForestConfig::new(100).unwrap().with_seed(42))
        .with_test_size(TestSize::Fraction(0.2))
        .unwrap()
        .with_seed(42)
}

#[test]
fn hundred_rows_reproducible_mse() {
    let dataset = synthetic_sales(100, 7);

    let first = hundred_row_config().run(&dataset).unwrap();
    let second = hundred_row_config().run(&dataset).unwrap();

    assert_eq!(first.n_test, 20);
    assert_eq!(first.n_train, 80);
    assert_eq!(first.mse, second.mse, "MSE differs across identical runs");
    assert_eq!(first.predictions, second.predictions);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn mse_is_mean_of_squared_residuals() {
    let report = hundred_row_config().run(&synthetic_sales(100, 7)).unwrap();

    let by_hand = report
        .actuals
        .iter()
        .zip(&report.predictions)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / report.n_test as f64;

    assert!(report.mse >= 0.0);
    assert!((report.mse - by_hand).abs() < 1e-9);
    assert_eq!(report.mse, mean_squared_error(&report.actuals, &report.predictions).unwrap());
}

#[test]
fn forest_beats_predicting_the_mean() {
    // The synthetic target is driven entirely by the three features, so the
    // forest must do far better than a constant guess.
    let report = hundred_row_config().run(&synthetic_sales(100, 7)).unwrap();
    let mean = report.actuals.iter().sum::<f64>() / report.actuals.len() as f64;
    let baseline =
        mean_squared_error(&report.actuals, &vec![mean; report.actuals.len()]).unwrap();

    assert!(report.mse < baseline, "mse {} vs baseline {baseline}", report.mse);
    assert!(report.r2 > 0.5, "r2 = {}", report.r2);
}

#[test]
fn test_rows_come_from_the_split() {
    let dataset = synthetic_sales(100, 7);
    let indices = TrainTestSplit::default().split(dataset.len()).unwrap();
    let report = hundred_row_config().run(&dataset).unwrap();

    let expected: Vec<f64> = dataset.select(indices.test()).targets();
    assert_eq!(report.actuals, expected);

    let train: HashSet<usize> = indices.train().iter().copied().collect();
    assert!(indices.test().iter().all(|i| !train.contains(i)));
}

#[test]
fn degenerate_datasets_fail_to_split() {
    let err = hundred_row_config().run(&SalesDataset::default()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSplit { n_samples: 0, .. }));

    let err = hundred_row_config().run(&synthetic_sales(1, 7)).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSplit { n_samples: 1, n_train: 0, n_test: 1 }));
}

#[test]
fn json_report_shape() {
    let report = hundred_row_config().run(&synthetic_sales(100, 7)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["n_test"], 20);
    assert_eq!(json["predictions"].as_array().unwrap().len(), 20);
    assert_eq!(json["importances"].as_array().unwrap().len(), 3);
    assert!(json["oob"].is_null());
    assert_eq!(json["mse"].as_f64().unwrap(), report.mse);
}
