use serde::{Deserialize, Serialize};

use super::peaks::PeakSet;

/// Unique curve identifier. Assigned by the registry's monotonic counter;
/// never reused within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CurveId(pub u64);

impl std::fmt::Display for CurveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Three-valued visibility state gating batch operations.
///
/// Only `Visible` curves participate in smoothing, baseline removal,
/// normalization and peak finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tristate {
    Visible,
    Hidden,
    Disabled,
}

impl Tristate {
    /// Numeric form used by checkbox-table hosts: 1, 0, -1.
    pub fn as_i8(self) -> i8 {
        match self {
            Tristate::Visible => 1,
            Tristate::Hidden => 0,
            Tristate::Disabled => -1,
        }
    }
}

impl std::fmt::Display for Tristate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tristate::Visible => write!(f, "visible"),
            Tristate::Hidden => write!(f, "hidden"),
            Tristate::Disabled => write!(f, "disabled"),
        }
    }
}

/// One loaded or derived (x, y) trace with its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    pub id: CurveId,
    /// Display name; also the registry lookup key, unique among active curves.
    pub label: String,
    pub x_data: Vec<f64>,
    pub y_data: Vec<f64>,
    /// Snapshot of y at creation, kept for a full reset.
    pub y_orig: Vec<f64>,
    pub tristate: Tristate,
    /// Marks the primary loaded curve as opposed to overlays.
    pub loaded: bool,
    peaks: Option<PeakSet>,
}

impl Curve {
    pub(crate) fn new(id: CurveId, label: &str, x_data: Vec<f64>, y_data: Vec<f64>) -> Self {
        let y_orig = y_data.clone();
        Self {
            id,
            label: label.to_string(),
            x_data,
            y_data,
            y_orig,
            tristate: Tristate::Visible,
            loaded: false,
            peaks: None,
        }
    }

    pub fn len(&self) -> usize {
        self.y_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_data.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.tristate == Tristate::Visible
    }

    pub fn has_peaks(&self) -> bool {
        self.peaks.is_some()
    }

    pub fn peaks(&self) -> Option<&PeakSet> {
        self.peaks.as_ref()
    }

    /// Attach a marker set, replacing any existing one.
    pub fn attach_peaks(&mut self, peaks: PeakSet) {
        self.peaks = Some(peaks);
    }

    /// Detach and return the marker set. Idempotent: detaching a curve
    /// without markers returns `None`.
    pub fn detach_peaks(&mut self) -> Option<PeakSet> {
        self.peaks.take()
    }
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Curve {
        Curve::new(CurveId(0), "probe", vec![0.0, 1.0, 2.0], vec![5.0, 6.0, 7.0])
    }

    #[test]
    fn creation_snapshots_y_orig() {
        let mut c = curve();
        c.y_data[1] = 99.0;
        assert_eq!(c.y_orig, vec![5.0, 6.0, 7.0]);
        assert_eq!(c.y_data, vec![5.0, 99.0, 7.0]);
    }

    #[test]
    fn detach_is_idempotent() {
        let mut c = curve();
        assert!(c.detach_peaks().is_none());
        c.attach_peaks(PeakSet::new("probe", vec![1.0], vec![6.0]));
        assert!(c.has_peaks());
        assert!(c.detach_peaks().is_some());
        assert!(c.detach_peaks().is_none());
        assert!(!c.has_peaks());
    }

    #[test]
    fn attach_replaces_existing_marker() {
        let mut c = curve();
        c.attach_peaks(PeakSet::new("probe", vec![0.0], vec![5.0]));
        c.attach_peaks(PeakSet::new("probe", vec![2.0], vec![7.0]));
        assert_eq!(c.peaks().unwrap().x_positions(), &[2.0]);
    }
}
