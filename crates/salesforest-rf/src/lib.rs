//! Random Forest regression: train, evaluate, predict.
//!
//! Provides a hand-rolled Random Forest regressor with CART regression
//! trees, squared-error and Poisson split criteria, parallel training via
//! rayon, out-of-bag evaluation, and MDI feature importance.

mod config;
mod error;
mod forest;
mod importance;
mod node;
mod oob;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, OobMode, RandomForestConfig};
pub use error::RfError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use oob::OobScore;
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
