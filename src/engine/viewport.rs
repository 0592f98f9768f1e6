use serde::{Deserialize, Serialize};

use crate::data::curve::Curve;

/// Data viewport owned by the core: axis bounds plus orientation flags.
///
/// The display layer renders whatever this says; reverse-axis actions only
/// toggle the orientation flags, they never touch the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_reversed: bool,
    pub y_reversed: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
            x_reversed: false,
            y_reversed: false,
        }
    }
}

impl Viewport {
    /// Recompute the bounds from the given curves, padding each side by 5%
    /// of the data span. Orientation flags are preserved. With no input
    /// samples the bounds are left unchanged.
    pub fn autoscale<'a>(&mut self, curves: impl Iterator<Item = &'a Curve>) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        let mut any = false;
        for curve in curves {
            for &x in &curve.x_data {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                any = true;
            }
            for &y in &curve.y_data {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
        if !any {
            return;
        }
        let x_pad = (x_max - x_min) * 0.05;
        let y_pad = (y_max - y_min) * 0.05;
        self.x_min = x_min - x_pad;
        self.x_max = x_max + x_pad;
        self.y_min = y_min - y_pad;
        self.y_max = y_max + y_pad;
    }
}
