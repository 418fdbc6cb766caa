//! Sales-quantity regression pipeline: split, fit, predict, score.
//!
//! The caller supplies a [`SalesDataset`]; [`PipelineConfig::run`] holds out
//! a seeded test partition, fits a [`salesforest_rf`] forest on the rest, and
//! reports the held-out mean squared error.

mod dataset;
mod error;
mod metrics;
mod pipeline;
mod split;
mod synthetic;

pub use dataset::{FEATURE_COLUMNS, SalesDataset, SalesRecord, TARGET_COLUMN};
pub use error::PipelineError;
pub use metrics::{mean_squared_error, r2_score};
pub use pipeline::{PipelineConfig, PipelineReport};
pub use split::{SplitIndices, TestSize, TrainTestSplit};
pub use synthetic::synthetic_sales;
