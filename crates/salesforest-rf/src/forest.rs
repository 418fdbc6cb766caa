//! Random Forest regression training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{MaxFeatures, OobMode, RandomForestConfig};
use crate::error::RfError;
use crate::importance::aggregate_importances;
use crate::oob::compute_oob;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig, validate_dataset};

/// A fitted Random Forest regressor.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Resolve `MaxFeatures` to a concrete count.
pub(crate) fn resolve_max_features(
    max_features: MaxFeatures,
    n_features: usize,
) -> Result<usize, RfError> {
    let resolved = match max_features {
        MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
        MaxFeatures::Log2 => (n_features as f64).log2().ceil().max(1.0) as usize,
        MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
        MaxFeatures::Fixed(n) => n,
        MaxFeatures::All => n_features,
    };
    if resolved == 0 || resolved > n_features {
        return Err(RfError::InvalidMaxFeatures {
            max_features: resolved,
            n_features,
        });
    }
    Ok(resolved)
}

/// Draw `draw_count` indices with replacement; also return the indices never drawn.
fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let bootstrap_indices: Vec<usize> = (0..draw_count)
        .map(|_| {
            let idx = rng.gen_range(0..n_samples);
            in_bag[idx] = true;
            idx
        })
        .collect();
    let oob_indices = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}

/// Train the Random Forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    targets: &[f64],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    let n_features = validate_dataset(features, targets, config.criterion)?;
    let n_samples = features.len();
    if feature_names.len() != n_features {
        return Err(RfError::FeatureNameMismatch {
            expected: n_features,
            got: feature_names.len(),
        });
    }

    let max_features_resolved = resolve_max_features(config.max_features, n_features)?;
    // Negated form so NaN is rejected.
    if !(config.bootstrap_fraction > 0.0 && config.bootstrap_fraction <= 1.0) {
        return Err(RfError::InvalidBootstrapFraction {
            fraction: config.bootstrap_fraction,
        });
    }

    let base_tree_config = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features_resolved));
    base_tree_config.validate()?;

    let draw_count = ((n_samples as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        max_features = max_features_resolved,
        draw_count,
        criterion = ?config.criterion,
        "training random forest regressor"
    );

    // Per-tree seeds come from one master stream so results do not depend on
    // how rayon schedules the trees.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_results: Vec<(DecisionTree, Vec<usize>)> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (bootstrap_indices, oob_indices) =
                bootstrap_sample(n_samples, draw_count, &mut rng);

            let boot_features: Vec<Vec<f64>> = bootstrap_indices
                .iter()
                .map(|&i| features[i].clone())
                .collect();
            let boot_targets: Vec<f64> = bootstrap_indices.iter().map(|&i| targets[i]).collect();

            let tree = base_tree_config
                .clone()
                .with_seed(rng.r#gen())
                .fit_validated(&boot_features, &boot_targets, n_features, max_features_resolved);

            (tree, oob_indices)
        })
        .collect();

    let (trees, oob_indices_per_tree): (Vec<DecisionTree>, Vec<Vec<usize>>) =
        tree_results.into_iter().unzip();

    let per_tree_importances: Vec<Vec<f64>> =
        trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree_importances, feature_names);

    debug!(
        n_trees_trained = trees.len(),
        mean_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>() as f64
            / trees.len() as f64,
        "tree training complete"
    );

    let oob_score = if config.oob_mode == OobMode::Enabled {
        Some(compute_oob(&trees, features, targets, &oob_indices_per_tree)?)
    } else {
        None
    };

    let forest = RandomForest {
        trees,
        n_features,
        feature_names: feature_names.to_vec(),
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_samples,
        max_features_resolved,
    };

    info!(
        oob_r2 = oob_score.as_ref().map(|s| s.r2),
        "random forest training complete"
    );

    Ok(RandomForestResult::new(forest, importances, oob_score, metadata))
}
