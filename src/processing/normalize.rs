//! Min-Max and Z-score normalization.

use crate::error::{EngineError, Result};

/// Rescale `y` into [0, 1]: `(y - min) / (max - min)`.
///
/// A constant signal has no range to map and yields
/// [`EngineError::DegenerateInput`] instead of NaN.
pub fn min_max(y: &[f64]) -> Result<Vec<f64>> {
    if y.is_empty() {
        return Err(EngineError::degenerate("min-max normalization", "empty signal"));
    }
    let min = y.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return Err(EngineError::degenerate(
            "min-max normalization",
            format!("signal range is {range} (min = {min}, max = {max})"),
        ));
    }
    Ok(y.iter().map(|v| (v - min) / range).collect())
}

/// Standardize `y` to zero mean and unit variance: `(y - mean) / std`,
/// with the population standard deviation.
pub fn z_score(y: &[f64]) -> Result<Vec<f64>> {
    if y.is_empty() {
        return Err(EngineError::degenerate("z-score normalization", "empty signal"));
    }
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let var = y.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return Err(EngineError::degenerate(
            "z-score normalization",
            format!("signal standard deviation is {std}"),
        ));
    }
    Ok(y.iter().map(|v| (v - mean) / std).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_maps_onto_unit_interval() {
        let out = min_max(&[2.0, 4.0, 6.0]).unwrap();
        assert_eq!(out, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn min_max_range_law() {
        let y = vec![-3.0, 7.5, 0.25, 19.0, -11.0, 4.0];
        let out = min_max(&y).unwrap();
        assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(out.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(out.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 1.0);
    }

    #[test]
    fn min_max_rejects_constant_signal() {
        let err = min_max(&[5.0, 5.0, 5.0]).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateInput { .. }));
    }

    #[test]
    fn z_score_standardizes() {
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let out = z_score(&y).unwrap();
        let mean: f64 = out.iter().sum::<f64>() / out.len() as f64;
        let var: f64 = out.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / out.len() as f64;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn z_score_rejects_zero_deviation() {
        let err = z_score(&[2.0, 2.0]).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateInput { .. }));
    }

    #[test]
    fn empty_signals_are_degenerate() {
        assert!(min_max(&[]).is_err());
        assert!(z_score(&[]).is_err());
    }
}
