//! Out-of-bag (OOB) evaluation for the Random Forest regressor.

use crate::error::RfError;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OobScore {
    /// Coefficient of determination of the OOB predictions.
    pub r2: f64,
    /// Mean squared error of the OOB predictions.
    pub mse: f64,
    /// Number of samples that had at least one OOB tree.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions, R², and MSE.
///
/// Each sample is predicted by averaging only the trees whose bootstrap
/// did not draw it. Samples with no OOB tree are left out of the score.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &[Vec<f64>],
    targets: &[f64],
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let n_samples = features.len();
    let mut sums = vec![0.0f64; n_samples];
    let mut counts = vec![0usize; n_samples];

    for (tree, oob_indices) in trees.iter().zip(oob_indices_per_tree) {
        for &sample_idx in oob_indices {
            sums[sample_idx] += tree.predict(&features[sample_idx])?;
            counts[sample_idx] += 1;
        }
    }

    let pairs: Vec<(f64, f64)> = (0..n_samples)
        .filter(|&i| counts[i] > 0)
        .map(|i| (targets[i], sums[i] / counts[i] as f64))
        .collect();

    if pairs.is_empty() {
        return Err(RfError::OobEvaluationFailed {
            reason: "no sample has any OOB tree".to_string(),
        });
    }

    let n = pairs.len() as f64;
    let ss_res: f64 = pairs.iter().map(|(y, p)| (y - p).powi(2)).sum();
    let mean = pairs.iter().map(|(y, _)| y).sum::<f64>() / n;
    let ss_tot: f64 = pairs.iter().map(|(y, _)| (y - mean).powi(2)).sum();

    Ok(OobScore {
        r2: r2_from_sums(ss_res, ss_tot),
        mse: ss_res / n,
        n_oob_samples: pairs.len(),
    })
}

/// `1 - ss_res / ss_tot`; constant targets score 1.0 when fitted exactly and
/// 0.0 otherwise.
fn r2_from_sums(ss_res: f64, ss_tot: f64) -> f64 {
    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::r2_from_sums;
    use crate::config::{OobMode, RandomForestConfig};
    use crate::error::RfError;

    #[test]
    fn half_bootstrap_covers_every_sample() {
        let features: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..50).map(|i| if i < 25 { 2.0 } else { 8.0 }).collect();
        let result = RandomForestConfig::new(30)
            .unwrap()
            .with_bootstrap_fraction(0.5)
            .with_oob_mode(OobMode::Enabled)
            .fit(&features, &targets, &["x".to_string()])
            .unwrap();
        let oob = result.oob_score().unwrap();
        assert_eq!(oob.n_oob_samples, 50);
        assert!(oob.r2 > 0.8, "r2 = {}", oob.r2);
    }

    #[test]
    fn one_sample_has_no_oob_tree() {
        // With a single sample every bootstrap draws it, so nothing is OOB.
        let err = RandomForestConfig::new(5)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .fit(&[vec![1.0]], &[3.0], &["x".to_string()])
            .unwrap_err();
        assert!(matches!(err, RfError::OobEvaluationFailed { .. }));
    }

    #[test]
    fn r2_handles_constant_targets() {
        assert!((r2_from_sums(1.0, 4.0) - 0.75).abs() < 1e-12);
        assert!((r2_from_sums(0.0, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!(r2_from_sums(2.0, 0.0).abs() < f64::EPSILON);
    }
}
