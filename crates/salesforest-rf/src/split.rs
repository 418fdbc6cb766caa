use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a regression split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Mean squared error around the node mean (variance reduction).
    SquaredError,
    /// Half mean Poisson deviance; suited to non-negative count targets.
    Poisson,
}

/// Running sufficient statistics of the targets reaching a node.
///
/// Both criteria can be evaluated from these sums, which lets the split
/// scan move one sample at a time from the right child to the left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct NodeStats {
    pub(crate) count: usize,
    pub(crate) sum: f64,
    pub(crate) sum_sq: f64,
    /// Σ y·ln(y), with 0·ln(0) = 0.
    pub(crate) sum_ylny: f64,
}

fn y_ln_y(y: f64) -> f64 {
    if y > 0.0 { y * y.ln() } else { 0.0 }
}

impl NodeStats {
    pub(crate) fn from_indices(targets: &[f64], sample_indices: &[usize]) -> Self {
        let mut stats = Self::default();
        for &si in sample_indices {
            stats.push(targets[si]);
        }
        stats
    }

    pub(crate) fn push(&mut self, y: f64) {
        self.count += 1;
        self.sum += y;
        self.sum_sq += y * y;
        self.sum_ylny += y_ln_y(y);
    }

    pub(crate) fn remove(&mut self, y: f64) {
        self.count -= 1;
        self.sum -= y;
        self.sum_sq -= y * y;
        self.sum_ylny -= y_ln_y(y);
    }
}

impl SplitCriterion {
    /// Impurity of a node computed directly from its targets.
    ///
    /// Two-pass and exact; used for node bookkeeping and the purity check.
    /// Returns zero for an empty node.
    #[must_use]
    pub fn impurity(&self, targets: &[f64], sample_indices: &[usize]) -> Impurity {
        let n = sample_indices.len();
        if n == 0 {
            return Impurity::new(0.0);
        }
        let mean = sample_indices.iter().map(|&si| targets[si]).sum::<f64>() / n as f64;
        let total: f64 = match self {
            SplitCriterion::SquaredError => sample_indices
                .iter()
                .map(|&si| {
                    let d = targets[si] - mean;
                    d * d
                })
                .sum(),
            SplitCriterion::Poisson => {
                if mean <= 0.0 {
                    0.0
                } else {
                    sample_indices
                        .iter()
                        .map(|&si| {
                            let y = targets[si];
                            y_ln_y(y) - y * mean.ln() - (y - mean)
                        })
                        .sum()
                }
            }
        };
        Impurity::new((total / n as f64).max(0.0))
    }

    /// `n · impurity` from running sums, or `None` when the child is not
    /// admissible (Poisson child with a non-positive mean).
    pub(crate) fn weighted_impurity(&self, stats: &NodeStats) -> Option<f64> {
        if stats.count == 0 {
            return Some(0.0);
        }
        let n = stats.count as f64;
        match self {
            SplitCriterion::SquaredError => {
                Some((stats.sum_sq - stats.sum * stats.sum / n).max(0.0))
            }
            SplitCriterion::Poisson => {
                if stats.sum <= 0.0 {
                    return None;
                }
                Some((stats.sum_ylny - stats.sum * (stats.sum / n).ln()).max(0.0))
            }
        }
    }
}

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// Weighted impurity decrease: `n·I(parent) - n_l·I(left) - n_r·I(right)`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Find the best split among a random subset of features.
///
/// For each of `max_features` randomly chosen features, sorts the samples
/// by value and scans left-to-right, moving one target at a time between
/// the running child statistics. Thresholds sit at the midpoint between
/// adjacent distinct values.
///
/// Returns `None` when no valid split exists (all values identical, or
/// every boundary violates `min_samples_leaf`).
///
/// `features` is column-major: `features[feature_idx][sample_idx]`.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    targets: &[f64],
    sample_indices: &[usize],
    criterion: SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = features.len();
    let n_samples = sample_indices.len();

    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let parent = NodeStats::from_indices(targets, sample_indices);
    let parent_weighted = criterion.weighted_impurity(&parent)?;

    // Partial Fisher-Yates over the first `max_features` positions.
    let mut feature_order: Vec<usize> = (0..n_features).collect();
    let take = max_features.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
    }

    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(FeatureIndex, f64)> = None;

    for &feat_idx in &feature_order[..take] {
        let feat_col = &features[feat_idx];

        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (feat_col[si], si))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = NodeStats::default();
        let mut right = parent;

        for i in 0..(n_samples - 1) {
            let (val_i, si) = sorted[i];
            let y = targets[si];
            left.push(y);
            right.remove(y);

            let val_next = sorted[i + 1].0;
            if val_i == val_next {
                continue;
            }
            if left.count < min_samples_leaf || right.count < min_samples_leaf {
                continue;
            }

            let (Some(left_w), Some(right_w)) = (
                criterion.weighted_impurity(&left),
                criterion.weighted_impurity(&right),
            ) else {
                continue;
            };

            let decrease = parent_weighted - left_w - right_w;
            if decrease.is_finite() && decrease > best_decrease {
                best_decrease = decrease;
                best = Some((FeatureIndex::new(feat_idx), (val_i + val_next) / 2.0));
            }
        }
    }

    let (feature, threshold) = best?;

    let feat_col = &features[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| feat_col[si] <= threshold);

    Some(SplitResult {
        feature,
        threshold,
        impurity_decrease: best_decrease.max(0.0),
        left_indices,
        right_indices,
    })
}
