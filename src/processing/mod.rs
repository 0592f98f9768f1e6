//! Signal-processing transforms.
//!
//! Each function is a pure mapping from one curve's y-data (plus a parameter
//! record) to a new y-array of the same length; the engine owns the swap into
//! the curve and the undo bookkeeping around it.

pub mod baseline;
pub mod normalize;
pub mod peaks;
pub mod smooth;

use serde::{Deserialize, Serialize};

/// Which batch transform to run over the visible curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    Smooth,
    Baseline,
    NormalizeMinMax,
    NormalizeZ,
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformKind::Smooth => write!(f, "Smooth"),
            TransformKind::Baseline => write!(f, "Baseline"),
            TransformKind::NormalizeMinMax => write!(f, "Normalize Min-Max"),
            TransformKind::NormalizeZ => write!(f, "Normalize Z"),
        }
    }
}
