//! Parameter records for the processing functions.
//!
//! Hosts typically deserialize these from their settings file and hand the
//! whole [`EngineConfig`] to [`crate::engine::SpectraEngine::apply_transform`].

use serde::{Deserialize, Serialize};

/// Savitzky-Golay smoothing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothParams {
    /// Filter window length in samples. Must be odd and > `polyorder`.
    pub window_length: usize,
    /// Order of the local polynomial fit.
    pub polyorder: usize,
    /// Derivative order to return; 0 yields the smoothed signal itself.
    pub deriv: usize,
    /// Sample spacing, applied when `deriv > 0`.
    pub delta: f64,
    /// Axis selector kept for settings-file compatibility; the data is
    /// one-dimensional so only 0 and -1 are accepted.
    pub axis: i32,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            window_length: 11,
            polyorder: 3,
            deriv: 0,
            delta: 1.0,
            axis: -1,
        }
    }
}

/// Asymmetric least squares baseline parameters (Eilers & Boelens, 2005).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineParams {
    /// Smoothness penalty; larger values give a smoother baseline.
    pub lam: f64,
    /// Asymmetry, 0 < p < 1. Points above the baseline estimate are weighted
    /// by `p`, points below by `1 - p`.
    pub p: f64,
    /// Fixed number of reweighting rounds.
    pub niter: usize,
}

impl Default for BaselineParams {
    fn default() -> Self {
        Self {
            lam: 1.0e5,
            p: 0.01,
            niter: 10,
        }
    }
}

/// One peak-detection constraint: a lower bound alone, or a
/// (lower, upper) pair. Deserializes from a bare number or a two-element
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Limit {
    Min(f64),
    Between(f64, f64),
}

impl Limit {
    /// Whether `value` satisfies the constraint.
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Limit::Min(lo) => value >= lo,
            Limit::Between(lo, hi) => value >= lo && value <= hi,
        }
    }
}

/// Peak detection constraints. Every field is optional; an unset field
/// places no constraint on that axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Required peak height.
    pub height: Option<Limit>,
    /// Required vertical distance to the two neighbouring samples.
    pub threshold: Option<Limit>,
    /// Minimal horizontal separation between accepted peaks, in samples
    /// (>= 1). The taller peak wins a conflict.
    pub distance: Option<f64>,
    /// Required prominence: drop from the peak to the surrounding valleys.
    pub prominence: Option<Limit>,
    /// Required peak width at half-prominence, in samples.
    pub width: Option<Limit>,
}

/// The full processing parameter set recognized by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub smooth: SmoothParams,
    pub baseline: BaselineParams,
    pub peaks: PeakParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_deserializes_from_scalar_and_pair() {
        let lo: Limit = serde_json::from_str("0.5").unwrap();
        assert_eq!(lo, Limit::Min(0.5));
        let pair: Limit = serde_json::from_str("[0.5, 2.0]").unwrap();
        assert_eq!(pair, Limit::Between(0.5, 2.0));
    }

    #[test]
    fn limit_contains() {
        assert!(Limit::Min(1.0).contains(1.0));
        assert!(!Limit::Min(1.0).contains(0.99));
        assert!(Limit::Between(0.0, 2.0).contains(2.0));
        assert!(!Limit::Between(0.0, 2.0).contains(2.1));
    }

    #[test]
    fn config_roundtrip_with_partial_input() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"smooth": {"window_length": 7}, "peaks": {"height": 0.5}}"#)
                .unwrap();
        assert_eq!(cfg.smooth.window_length, 7);
        assert_eq!(cfg.smooth.polyorder, 3);
        assert_eq!(cfg.peaks.height, Some(Limit::Min(0.5)));
        assert_eq!(cfg.peaks.distance, None);

        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
