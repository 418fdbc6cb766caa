//! Error types for salesforest-pipeline.

use salesforest_rf::RfError;

/// Errors from splitting, scoring, or running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Returned when a fractional test size is not in (0.0, 1.0).
    #[error("test_size fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when the requested sizes leave the train or test partition empty.
    #[error(
        "cannot split {n_samples} samples into {n_train} train and {n_test} test rows; both partitions must be non-empty"
    )]
    InvalidSplit {
        /// Number of rows in the dataset.
        n_samples: usize,
        /// Resulting train partition size.
        n_train: usize,
        /// Resulting test partition size.
        n_test: usize,
    },

    /// Returned when true and predicted values have different lengths.
    #[error("got {n_true} true values but {n_pred} predictions")]
    LengthMismatch {
        /// Number of true values.
        n_true: usize,
        /// Number of predicted values.
        n_pred: usize,
    },

    /// Returned when a metric is asked to score zero observations.
    #[error("cannot score an empty set of observations")]
    EmptyInput,

    /// Returned when the forest rejects the data or its configuration.
    #[error("random forest failed")]
    Model(#[from] RfError),
}
