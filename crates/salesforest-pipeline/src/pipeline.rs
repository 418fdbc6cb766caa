//! The split → fit → predict → score pipeline.

use std::fmt;

use salesforest_rf::{OobScore, RandomForestConfig, RankedFeature};
use tracing::{info, instrument};

use crate::dataset::SalesDataset;
use crate::error::PipelineError;
use crate::metrics::{mean_squared_error, r2_score};
use crate::split::{TestSize, TrainTestSplit};

/// Configuration for one pipeline run.
///
/// Construct via [`PipelineConfig::new`], then chain `with_*` methods.
/// Defaults to a 20% test partition shuffled with seed 42.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    split: TrainTestSplit,
    forest: RandomForestConfig,
}

impl PipelineConfig {
    /// Create a pipeline around the given forest configuration.
    #[must_use]
    pub fn new(forest: RandomForestConfig) -> Self {
        Self {
            split: TrainTestSplit::default(),
            forest,
        }
    }

    /// Set the held-out partition size, keeping the current split seed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTestFraction`] if a fraction is not in (0.0, 1.0).
    pub fn with_test_size(mut self, test_size: TestSize) -> Result<Self, PipelineError> {
        self.split = TrainTestSplit::new(test_size)?.with_seed(self.split.seed());
        Ok(self)
    }

    /// Set the split shuffle seed. The forest keeps its own seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split = self.split.with_seed(seed);
        self
    }

    /// Return the split configuration.
    #[must_use]
    pub fn split(&self) -> &TrainTestSplit {
        &self.split
    }

    /// Return the forest configuration.
    #[must_use]
    pub fn forest(&self) -> &RandomForestConfig {
        &self.forest
    }

    /// Hold out a test partition, fit on the rest, and score the held-out rows.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                         |
    /// |-----------------------------------|----------------------------------------------|
    /// | [`PipelineError::InvalidSplit`]   | fewer than two rows, or an empty partition   |
    /// | [`PipelineError::Model`]          | the forest rejects the data or configuration |
    #[instrument(skip_all, fields(n_rows = dataset.len()))]
    pub fn run(&self, dataset: &SalesDataset) -> Result<PipelineReport, PipelineError> {
        let (train, test) = self.split.split_dataset(dataset)?;
        info!(n_train = train.len(), n_test = test.len(), "dataset split");

        let result = self
            .forest
            .fit(&train.features(), &train.targets(), &dataset.feature_names())?;

        let actuals = test.targets();
        let predictions = result.forest().predict_batch(&test.features())?;
        let mse = mean_squared_error(&actuals, &predictions)?;
        let r2 = r2_score(&actuals, &predictions)?;
        info!(mse, r2, "held-out evaluation complete");

        Ok(PipelineReport {
            mse,
            r2,
            n_train: train.len(),
            n_test: test.len(),
            actuals,
            predictions,
            importances: result.importances().to_vec(),
            oob: result.oob_score().cloned(),
        })
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineReport {
    /// Mean squared error on the test partition.
    pub mse: f64,
    /// R² on the test partition.
    pub r2: f64,
    /// Rows used for fitting.
    pub n_train: usize,
    /// Rows held out.
    pub n_test: usize,
    /// True `SalesQuantity` of the test rows, in split order.
    pub actuals: Vec<f64>,
    /// Predictions for the test rows, aligned with `actuals`.
    pub predictions: Vec<f64>,
    /// MDI feature importances of the fitted forest.
    pub importances: Vec<RankedFeature>,
    /// Out-of-bag score, when the forest computed one.
    pub oob: Option<OobScore>,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `{:?}` keeps the trailing `.0` on integral values.
        write!(f, "Mean Squared Error: {:?}", self.mse)
    }
}
