//! Regression metrics.

use crate::error::PipelineError;

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<(), PipelineError> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::LengthMismatch {
            n_true: y_true.len(),
            n_pred: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(())
}

/// Mean of the squared differences between true and predicted values.
///
/// # Errors
///
/// | Variant                            | When                        |
/// |------------------------------------|-----------------------------|
/// | [`PipelineError::LengthMismatch`]  | slices differ in length     |
/// | [`PipelineError::EmptyInput`]      | both slices are empty       |
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, PipelineError> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// For constant `y_true` the ratio is undefined; this returns 1.0 when the
/// predictions are exact and 0.0 otherwise.
///
/// # Errors
///
/// Same as [`mean_squared_error`].
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64, PipelineError> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    Ok(if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_matches_hand_computation() {
        let mse = mean_squared_error(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]).unwrap();
        assert!((mse - 0.375).abs() < 1e-12);
    }

    #[test]
    fn mse_zero_for_perfect_predictions() {
        let y = [10.0, 20.0, 30.0];
        assert_eq!(mean_squared_error(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn mse_is_symmetric_and_non_negative() {
        let a = [1.0, 4.0, -2.0];
        let b = [0.0, 6.0, 1.0];
        let ab = mean_squared_error(&a, &b).unwrap();
        assert!(ab >= 0.0);
        assert_eq!(ab, mean_squared_error(&b, &a).unwrap());
    }

    #[test]
    fn r2_known_value() {
        let r2 = r2_score(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]).unwrap();
        assert!((r2 - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn r2_constant_truth() {
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_and_empty_inputs() {
        assert!(matches!(
            mean_squared_error(&[1.0], &[1.0, 2.0]),
            Err(PipelineError::LengthMismatch { n_true: 1, n_pred: 2 })
        ));
        assert!(matches!(r2_score(&[], &[]), Err(PipelineError::EmptyInput)));
    }
}
