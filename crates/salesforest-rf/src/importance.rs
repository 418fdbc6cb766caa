//! Feature importance aggregation across trees.

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized MDI importance (sums to 1.0 across features when any tree split).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Sum per-tree importances, normalize, and rank them in descending order.
///
/// Ties keep the original column order.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    let mut totals = vec![0.0f64; names.len()];
    for tree_imp in per_tree {
        for (total, &val) in totals.iter_mut().zip(tree_imp) {
            *total += val;
        }
    }

    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();

    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feat) in ranked.iter_mut().enumerate() {
        feat.rank = i + 1;
    }
    ranked
}
