//! The tagged undo/redo log entries.

use serde::{Deserialize, Serialize};

use crate::data::curve::{Curve, CurveId};
use crate::data::peaks::PeakSet;

use super::viewport::Viewport;

/// One entry in the undo/redo stacks.
///
/// Each variant carries exactly what its kind needs to reverse and replay:
/// old/new y-arrays for the transforms, ownership slots for objects that
/// leave the registry, nothing for self-inverse axis flips.
///
/// Ownership rule for the `Option` slots (`previous`, `added`, `marker`,
/// `ClearTable` markers): the slot holds the object precisely while the
/// registry (or the owning curve) does not. Undo and redo move objects
/// between the model and the slot instead of cloning them.
#[derive(Debug)]
pub enum Action {
    Load {
        /// Curve displaced by the load; parked here while the loaded curve
        /// is active. Stays `None` forever when the registry was empty.
        previous: Option<Curve>,
        /// Distinguishes "registry was empty" from "slot vacated by undo".
        had_previous: bool,
        loaded: CurveId,
        old_viewport: Viewport,
        new_viewport: Viewport,
    },
    AddPlot {
        /// The curve that was "last added" before this one. Payload only;
        /// no undo/redo effect reads it.
        prior_added: Option<CurveId>,
        added_id: CurveId,
        /// Parking slot for the added curve while undone.
        added: Option<Curve>,
        old_viewport: Viewport,
        new_viewport: Viewport,
    },
    Smooth {
        curve: CurveId,
        previous: Vec<f64>,
        current: Vec<f64>,
    },
    Baseline {
        curve: CurveId,
        previous: Vec<f64>,
        current: Vec<f64>,
    },
    NormalizeMinMax {
        curve: CurveId,
        previous: Vec<f64>,
        current: Vec<f64>,
    },
    NormalizeZ {
        curve: CurveId,
        previous: Vec<f64>,
        current: Vec<f64>,
    },
    Reset {
        curve: CurveId,
        previous: Vec<f64>,
        current: Vec<f64>,
    },
    Peaks {
        curve: CurveId,
        /// Parking slot for the marker while undone; `None` while it is
        /// attached to the curve.
        marker: Option<PeakSet>,
    },
    ReverseX,
    ReverseY,
    Label {
        previous: (String, String),
        current: (String, String),
    },
    NewManualPeak {
        row: (f64, f64),
    },
    DeleteManualPeak {
        row: (f64, f64),
    },
    ClearTable {
        /// Detached markers, parked per owning curve while cleared.
        markers: Vec<(CurveId, Option<PeakSet>)>,
        /// Snapshot of the manual peak table before clearing.
        rows: Vec<(f64, f64)>,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Load { .. } => ActionKind::Load,
            Action::AddPlot { .. } => ActionKind::AddPlot,
            Action::Smooth { .. } => ActionKind::Smooth,
            Action::Baseline { .. } => ActionKind::Baseline,
            Action::NormalizeMinMax { .. } => ActionKind::NormalizeMinMax,
            Action::NormalizeZ { .. } => ActionKind::NormalizeZ,
            Action::Reset { .. } => ActionKind::Reset,
            Action::Peaks { .. } => ActionKind::Peaks,
            Action::ReverseX => ActionKind::ReverseX,
            Action::ReverseY => ActionKind::ReverseY,
            Action::Label { .. } => ActionKind::Label,
            Action::NewManualPeak { .. } => ActionKind::NewManualPeak,
            Action::DeleteManualPeak { .. } => ActionKind::DeleteManualPeak,
            Action::ClearTable { .. } => ActionKind::ClearTable,
        }
    }

    /// The curve the action targets, when it targets exactly one.
    pub fn curve_id(&self) -> Option<CurveId> {
        match self {
            Action::Load { loaded, .. } => Some(*loaded),
            Action::AddPlot { added_id, .. } => Some(*added_id),
            Action::Smooth { curve, .. }
            | Action::Baseline { curve, .. }
            | Action::NormalizeMinMax { curve, .. }
            | Action::NormalizeZ { curve, .. }
            | Action::Reset { curve, .. }
            | Action::Peaks { curve, .. } => Some(*curve),
            _ => None,
        }
    }
}

/// Discriminant of an [`Action`], shared with hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Load,
    AddPlot,
    Smooth,
    Baseline,
    NormalizeMinMax,
    NormalizeZ,
    Reset,
    Peaks,
    ReverseX,
    ReverseY,
    Label,
    NewManualPeak,
    DeleteManualPeak,
    ClearTable,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Load => write!(f, "Load"),
            ActionKind::AddPlot => write!(f, "Add Plot"),
            ActionKind::Smooth => write!(f, "Smooth"),
            ActionKind::Baseline => write!(f, "Baseline"),
            ActionKind::NormalizeMinMax => write!(f, "Normalize Min-Max"),
            ActionKind::NormalizeZ => write!(f, "Normalize Z"),
            ActionKind::Reset => write!(f, "Reset"),
            ActionKind::Peaks => write!(f, "Peaks"),
            ActionKind::ReverseX => write!(f, "Reverse X"),
            ActionKind::ReverseY => write!(f, "Reverse Y"),
            ActionKind::Label => write!(f, "Label"),
            ActionKind::NewManualPeak => write!(f, "New Manual Peak"),
            ActionKind::DeleteManualPeak => write!(f, "Delete Manual Peak"),
            ActionKind::ClearTable => write!(f, "Clear Table"),
        }
    }
}

/// What the host receives after a mutation, an undo, or a redo: enough to
/// decide what to re-render, without reaching into the engine's internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub kind: ActionKind,
    /// The affected curve, when the action targets exactly one.
    pub curve: Option<CurveId>,
    /// Label of the affected curve, when it is still active.
    pub label: Option<String>,
}
