use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Impurity, Node, NodeIndex},
    split::{SplitCriterion, find_best_split},
};

/// Configuration for a single CART regression tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `SquaredError`        |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::SquaredError,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until leaves are pure or too small to split.
    /// `Some(d)` limits depth to `d` levels (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the maximum number of features to consider at each split.
    ///
    /// `None` means consider all features.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the structural parameters, independent of any dataset.
    pub(crate) fn validate(&self) -> Result<(), RfError> {
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }

    /// Train a regression tree on the provided row-major dataset.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                                            |
    /// |-------------------------------------|-------------------------------------------------|
    /// | [`RfError::EmptyDataset`]           | `features` is empty                             |
    /// | [`RfError::ZeroFeatures`]           | rows have zero feature columns                  |
    /// | [`RfError::FeatureCountMismatch`]   | rows have inconsistent lengths                  |
    /// | [`RfError::TargetCountMismatch`]    | `targets.len() != features.len()`               |
    /// | [`RfError::NonFiniteValue`]         | any feature value is NaN or infinite            |
    /// | [`RfError::NonFiniteTarget`]        | any target is NaN or infinite                   |
    /// | [`RfError::NegativeTarget`]         | Poisson criterion with a negative target        |
    /// | [`RfError::InvalidMaxFeatures`]     | `max_features` outside [1, n_features]          |
    /// | [`RfError::InvalidMaxDepth`]        | `max_depth` is `Some(0)`                        |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split` < 2                         |
    /// | [`RfError::InvalidMinSamplesLeaf`]  | `min_samples_leaf` < 1                          |
    #[instrument(skip(self, features, targets), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<DecisionTree, RfError> {
        let n_features = validate_dataset(features, targets, self.criterion)?;
        self.validate()?;

        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        Ok(self.fit_validated(features, targets, n_features, max_features))
    }

    /// Grow the tree on data that has already passed [`validate_dataset`].
    pub(crate) fn fit_validated(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        n_features: usize,
        max_features: usize,
    ) -> DecisionTree {
        // Column-major copy for the split scan.
        let col_features: Vec<Vec<f64>> = (0..n_features)
            .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
            .collect();

        let sample_indices: Vec<usize> = (0..features.len()).collect();
        let mut builder = TreeBuilder {
            col_features: &col_features,
            targets,
            config: self,
            max_features,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        builder.grow(&sample_indices, 0);

        debug!(
            n_nodes = builder.arena.len(),
            max_features,
            "regression tree built"
        );

        DecisionTree {
            nodes: builder.arena,
            n_features,
        }
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check shape and finiteness of a training set; return the feature width.
pub(crate) fn validate_dataset(
    features: &[Vec<f64>],
    targets: &[f64],
    criterion: SplitCriterion,
) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if targets.len() != features.len() {
        return Err(RfError::TargetCountMismatch {
            n_samples: features.len(),
            n_targets: targets.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    for (sample_index, &value) in targets.iter().enumerate() {
        if !value.is_finite() {
            return Err(RfError::NonFiniteTarget { sample_index });
        }
        if criterion == SplitCriterion::Poisson && value < 0.0 {
            return Err(RfError::NegativeTarget {
                sample_index,
                value,
            });
        }
    }
    Ok(n_features)
}

struct TreeBuilder<'a> {
    col_features: &'a [Vec<f64>],
    targets: &'a [f64],
    config: &'a DecisionTreeConfig,
    max_features: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Recursively grow the subtree for `sample_indices`, returning its root.
    fn grow(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let n_samples = sample_indices.len();
        let impurity = self.config.criterion.impurity(self.targets, sample_indices);
        let value = sample_indices.iter().map(|&si| self.targets[si]).sum::<f64>() / n_samples as f64;

        let depth_exceeded = self.config.max_depth.is_some_and(|max_d| depth >= max_d);
        let too_few = n_samples < self.config.min_samples_split
            || n_samples < 2 * self.config.min_samples_leaf;
        let pure = impurity.value() <= f64::EPSILON;

        if depth_exceeded || too_few || pure {
            return self.push_leaf(value, impurity, n_samples);
        }

        let Some(split) = find_best_split(
            self.col_features,
            self.targets,
            sample_indices,
            self.config.criterion,
            self.max_features,
            self.config.min_samples_leaf,
            &mut self.rng,
        ) else {
            return self.push_leaf(value, impurity, n_samples);
        };

        // Reserve the slot so the parent precedes its children in the arena.
        let node_idx = self.push_leaf(value, impurity, n_samples);
        let left = self.grow(&split.left_indices, depth + 1);
        let right = self.grow(&split.right_indices, depth + 1);

        self.arena[node_idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            impurity_decrease: split.impurity_decrease,
        };
        node_idx
    }

    fn push_leaf(&mut self, value: f64, impurity: Impurity, n_samples: usize) -> NodeIndex {
        let idx = self.arena.len();
        self.arena.push(Node::Leaf {
            value,
            impurity,
            n_samples,
        });
        NodeIndex::new(idx)
    }
}

/// A fitted CART regression tree.
///
/// Stored as an arena `Vec<Node>` with the root at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict the target for a single sample.
    ///
    /// Walks from the root: at each `Split`, goes left when
    /// `sample[feature] <= threshold`, right otherwise, and returns the
    /// mean stored in the leaf it reaches.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<f64, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.leaf_value(sample))
    }

    /// Leaf value for a sample whose width has already been checked.
    pub(crate) fn leaf_value(&self, sample: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Compute Mean Decrease in Impurity (MDI) feature importances.
    ///
    /// Sums each split's `impurity_decrease` by feature and normalizes to
    /// 1.0. All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Borrow the node arena (root at index 0).
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, d)) = stack.pop() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        let targets = vec![10.0, 10.0, 10.0, 40.0, 40.0, 40.0];
        (features, targets)
    }

    #[test]
    fn empty_dataset_error() {
        let err = DecisionTreeConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn constant_target_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let targets = vec![7.0, 7.0, 7.0];
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert!((tree.predict(&[2.0, 3.0]).unwrap() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn step_function_recovered() {
        let (features, targets) = step_data();
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        assert!((tree.predict(&[2.0, 0.0]).unwrap() - 10.0).abs() < 1e-12);
        assert!((tree.predict(&[11.5, 0.0]).unwrap() - 40.0).abs() < 1e-12);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn max_depth_limits_tree_and_averages_leaves() {
        let features: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..8).map(|i| (i * i) as f64).collect();
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &targets)
            .unwrap();
        assert!(tree.depth() <= 1);
        assert_eq!(tree.n_leaves(), 2);

        let root_mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let weighted: f64 = tree
            .nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Leaf { value, n_samples, .. } => Some(value * *n_samples as f64),
                Node::Split { .. } => None,
            })
            .sum::<f64>()
            / targets.len() as f64;
        assert!((weighted - root_mean).abs() < 1e-9);
    }

    #[test]
    fn min_samples_leaf_respected() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let tree = DecisionTreeConfig::new()
            .with_min_samples_leaf(3)
            .fit(&features, &targets)
            .unwrap();
        assert!(tree.nodes().iter().filter(|n| n.is_leaf()).all(|n| n.n_samples() >= 3));
    }

    #[test]
    fn importances_favor_informative_feature() {
        let features: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, (i % 2) as f64])
            .collect();
        let targets: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 9.0 }).collect();
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        let imp = tree.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        assert!(imp[0] > imp[1]);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let features: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![(i % 7) as f64, (i % 3) as f64, (i % 5) as f64])
            .collect();
        let targets: Vec<f64> = (0..30).map(|i| ((i * 13) % 17) as f64).collect();
        let config = DecisionTreeConfig::new().with_max_features(Some(1)).with_seed(123);
        let tree1 = config.fit(&features, &targets).unwrap();
        let tree2 = config.fit(&features, &targets).unwrap();
        for sample in &features {
            assert_eq!(tree1.predict(sample).unwrap(), tree2.predict(sample).unwrap());
        }
    }

    #[test]
    fn prediction_feature_mismatch() {
        let (features, targets) = step_data();
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn invalid_inputs_rejected() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![3.0]], &[0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, RfError::FeatureCountMismatch { sample_index: 1, .. }));

        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, f64::NAN]], &[0.0])
            .unwrap_err();
        assert!(matches!(err, RfError::NonFiniteValue { feature_index: 1, .. }));

        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0]], &[f64::INFINITY])
            .unwrap_err();
        assert!(matches!(err, RfError::NonFiniteTarget { sample_index: 0 }));

        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0], vec![2.0]], &[1.0])
            .unwrap_err();
        assert!(matches!(err, RfError::TargetCountMismatch { n_samples: 2, n_targets: 1 }));

        let err = DecisionTreeConfig::new()
            .with_criterion(SplitCriterion::Poisson)
            .fit(&[vec![1.0], vec![2.0]], &[1.0, -3.0])
            .unwrap_err();
        assert!(matches!(err, RfError::NegativeTarget { sample_index: 1, .. }));

        let err = DecisionTreeConfig::new()
            .with_max_depth(Some(0))
            .fit(&[vec![1.0]], &[1.0])
            .unwrap_err();
        assert!(matches!(err, RfError::InvalidMaxDepth { .. }));
    }

    #[test]
    fn poisson_tree_fits_counts() {
        let features: Vec<Vec<f64>> = (0..12).map(|i| vec![(i / 4) as f64]).collect();
        let targets = vec![
            0.0, 1.0, 0.0, 1.0, 4.0, 5.0, 4.0, 5.0, 20.0, 21.0, 20.0, 21.0,
        ];
        let tree = DecisionTreeConfig::new()
            .with_criterion(SplitCriterion::Poisson)
            .fit(&features, &targets)
            .unwrap();
        assert!((tree.predict(&[0.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!((tree.predict(&[1.0]).unwrap() - 4.5).abs() < 1e-12);
        assert!((tree.predict(&[2.0]).unwrap() - 20.5).abs() < 1e-12);
    }
}
