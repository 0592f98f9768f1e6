//! Savitzky-Golay smoothing: local least-squares polynomial regression.

use nalgebra::DMatrix;

use crate::config::SmoothParams;
use crate::error::{EngineError, Result};

/// Apply a Savitzky-Golay filter to `y`, returning the filtered signal (or
/// its `deriv`-th derivative when requested).
///
/// Interior samples come from a fixed convolution kernel; the first and last
/// half-windows are filled by evaluating a polynomial fitted to the edge
/// window, so the output has no truncation artifacts at the boundaries.
pub fn savgol_filter(y: &[f64], params: &SmoothParams) -> Result<Vec<f64>> {
    validate(params, y.len())?;

    let window = params.window_length;
    let half = window / 2;
    let n = y.len();

    // A derivative order above the polynomial degree is identically zero.
    if params.deriv > params.polyorder {
        return Ok(vec![0.0; n]);
    }

    let coeffs = savgol_coeffs(window, params.polyorder, params.deriv, params.delta)?;

    let mut out = vec![0.0; n];
    for i in half..n - half {
        let mut acc = 0.0;
        for (j, c) in coeffs.iter().enumerate() {
            acc += c * y[i + j - half];
        }
        out[i] = acc;
    }

    fit_edge(y, 0..window, 0..half, params, &mut out)?;
    fit_edge(y, n - window..n, n - half..n, params, &mut out)?;

    Ok(out)
}

fn validate(params: &SmoothParams, len: usize) -> Result<()> {
    if params.window_length % 2 == 0 {
        return Err(EngineError::invalid(
            "window_length",
            format!("must be a positive odd integer, got {}", params.window_length),
        ));
    }
    if params.polyorder >= params.window_length {
        return Err(EngineError::invalid(
            "polyorder",
            format!(
                "must be less than window_length ({} >= {})",
                params.polyorder, params.window_length
            ),
        ));
    }
    if params.window_length > len {
        return Err(EngineError::invalid(
            "window_length",
            format!("exceeds signal length ({} > {len})", params.window_length),
        ));
    }
    if params.deriv > 0 && params.delta <= 0.0 {
        return Err(EngineError::invalid(
            "delta",
            format!("must be positive when deriv > 0, got {}", params.delta),
        ));
    }
    if params.axis != 0 && params.axis != -1 {
        return Err(EngineError::invalid(
            "axis",
            format!("data is one-dimensional; axis must be 0 or -1, got {}", params.axis),
        ));
    }
    Ok(())
}

/// Convolution coefficients for the interior samples.
///
/// Row `deriv` of the pseudo-inverse of the Vandermonde design matrix over
/// the centered window gives the least-squares filter weights; the
/// `deriv! / delta^deriv` factor converts the fitted polynomial coefficient
/// into a derivative value.
fn savgol_coeffs(window: usize, polyorder: usize, deriv: usize, delta: f64) -> Result<Vec<f64>> {
    let half = (window / 2) as f64;
    let design = DMatrix::from_fn(window, polyorder + 1, |i, k| (i as f64 - half).powi(k as i32));
    let pinv = design
        .pseudo_inverse(1e-12)
        .map_err(|e| EngineError::degenerate("smoothing", e))?;

    let scale = factorial(deriv) / delta.powi(deriv as i32);
    Ok((0..window).map(|j| pinv[(deriv, j)] * scale).collect())
}

/// Fill `interp` output samples from a polynomial fitted over `window`.
fn fit_edge(
    y: &[f64],
    window: std::ops::Range<usize>,
    interp: std::ops::Range<usize>,
    params: &SmoothParams,
    out: &mut [f64],
) -> Result<()> {
    let w = window.len();
    let start = window.start;

    let design = DMatrix::from_fn(w, params.polyorder + 1, |i, k| (i as f64).powi(k as i32));
    let pinv = design
        .pseudo_inverse(1e-12)
        .map_err(|e| EngineError::degenerate("smoothing", e))?;

    let mut beta = vec![0.0; params.polyorder + 1];
    for (k, b) in beta.iter_mut().enumerate() {
        let mut acc = 0.0;
        for i in 0..w {
            acc += pinv[(k, i)] * y[start + i];
        }
        *b = acc;
    }

    let scale = params.delta.powi(params.deriv as i32);
    for i in interp {
        let x = (i - start) as f64;
        let mut val = 0.0;
        for (k, b) in beta.iter().enumerate().skip(params.deriv) {
            val += b * falling_factorial(k, params.deriv) * x.powi((k - params.deriv) as i32);
        }
        out[i] = val / scale;
    }
    Ok(())
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|v| v as f64).product()
}

/// k · (k-1) · … · (k-d+1)
fn falling_factorial(k: usize, d: usize) -> f64 {
    (k - d + 1..=k).map(|v| v as f64).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(window_length: usize, polyorder: usize) -> SmoothParams {
        SmoothParams {
            window_length,
            polyorder,
            ..SmoothParams::default()
        }
    }

    #[test]
    fn reproduces_a_quadratic_exactly() {
        let y: Vec<f64> = (0..25).map(|i| 0.3 * (i * i) as f64 - 2.0 * i as f64).collect();
        let out = savgol_filter(&y, &params(7, 2)).unwrap();
        for (a, b) in y.iter().zip(&out) {
            assert!((a - b).abs() < 1e-8, "expected {a}, got {b}");
        }
    }

    #[test]
    fn interior_equals_moving_average_for_linear_fit() {
        let y = vec![1.0, 4.0, 2.0, 8.0, 5.0, 3.0, 7.0];
        let out = savgol_filter(&y, &params(3, 1)).unwrap();
        for i in 1..y.len() - 1 {
            let avg = (y[i - 1] + y[i] + y[i + 1]) / 3.0;
            assert!((out[i] - avg).abs() < 1e-10);
        }
    }

    #[test]
    fn first_derivative_of_ramp_uses_delta() {
        let y: Vec<f64> = (0..40).map(|i| 3.0 * i as f64).collect();
        let p = SmoothParams {
            window_length: 5,
            polyorder: 2,
            deriv: 1,
            delta: 0.5,
            axis: -1,
        };
        let out = savgol_filter(&y, &p).unwrap();
        // spacing 0.5 makes the slope 3 / 0.5 = 6 everywhere, edges included
        for v in out {
            assert!((v - 6.0).abs() < 1e-8, "got {v}");
        }
    }

    #[test]
    fn derivative_above_polyorder_is_zero() {
        let y = vec![1.0, 5.0, 2.0, 7.0, 3.0, 8.0, 4.0];
        let p = SmoothParams {
            window_length: 5,
            polyorder: 2,
            deriv: 3,
            ..SmoothParams::default()
        };
        let out = savgol_filter(&y, &p).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn even_window_is_rejected() {
        let y = vec![0.0; 16];
        let err = savgol_filter(&y, &params(8, 2)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "window_length", .. }));
    }

    #[test]
    fn polyorder_must_stay_below_window() {
        let y = vec![0.0; 16];
        let err = savgol_filter(&y, &params(5, 5)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "polyorder", .. }));
    }

    #[test]
    fn window_longer_than_signal_is_rejected() {
        let y = vec![0.0; 5];
        let err = savgol_filter(&y, &params(7, 2)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "window_length", .. }));
    }

    #[test]
    fn output_length_matches_input() {
        let y: Vec<f64> = (0..33).map(|i| (i as f64 * 0.7).sin()).collect();
        let out = savgol_filter(&y, &params(11, 3)).unwrap();
        assert_eq!(out.len(), y.len());
    }
}
