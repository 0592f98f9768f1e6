//! The command/undo-redo engine.
//!
//! `SpectraEngine` ties the subsystems together: the curve registry, the two
//! action stacks, the manual peak table, the viewport, the axis labels and
//! the session journal. Hosts call one method per user operation; every
//! mutation appends a tagged [`Action`] to the undo stack, and `undo`/`redo`
//! move entries between the stacks while reversing or replaying their
//! effects on the data model. The engine never touches rendering; hosts
//! re-render from the returned [`ActionRecord`]s and the accessors.

pub mod action;
pub mod viewport;

use serde::Serialize;

use crate::config::{EngineConfig, PeakParams};
use crate::data::curve::{Curve, CurveId, Tristate};
use crate::data::peaks::{ManualPeakTable, PeakSet};
use crate::data::registry::CurveRegistry;
use crate::error::{EngineError, Result};
use crate::log::session::SessionLog;
use crate::processing::{baseline, normalize, peaks, smooth, TransformKind};

pub use action::{Action, ActionKind, ActionRecord};
pub use viewport::Viewport;

/// Axis selector for [`SpectraEngine::shift_visible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Flat export of one curve: `x, y[, peaks_x, peaks_y]`.
#[derive(Debug, Clone, Serialize)]
pub struct CurveExport {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub peaks_x: Option<Vec<f64>>,
    pub peaks_y: Option<Vec<f64>>,
}

impl From<&Curve> for CurveExport {
    fn from(curve: &Curve) -> Self {
        Self {
            label: curve.label.clone(),
            x: curve.x_data.clone(),
            y: curve.y_data.clone(),
            peaks_x: curve.peaks().map(|p| p.x_positions().to_vec()),
            peaks_y: curve.peaks().map(|p| p.y_positions().to_vec()),
        }
    }
}

/// The spectrum-editing engine.
///
/// Single-threaded by contract: callers must serialize access; concurrent
/// `undo`/`apply` calls on one engine are not supported.
pub struct SpectraEngine {
    registry: CurveRegistry,
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
    manual_peaks: ManualPeakTable,
    /// Loaded curves displaced by later loads, most recent last.
    load_history: Vec<Curve>,
    /// Ids of curves added as overlays, in order.
    added: Vec<CurveId>,
    viewport: Viewport,
    xlabel: String,
    ylabel: String,
    session: SessionLog,
}

impl SpectraEngine {
    pub fn new() -> Self {
        Self {
            registry: CurveRegistry::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            manual_peaks: ManualPeakTable::new(),
            load_history: Vec::new(),
            added: Vec::new(),
            viewport: Viewport::default(),
            xlabel: String::new(),
            ylabel: String::new(),
            session: SessionLog::new(),
        }
    }

    // ── Loading ─────────────────────────────────────────────────────────

    /// Load a curve as the new working set.
    ///
    /// Any current working set is displaced: the last-inserted curve goes
    /// into the action record, earlier loaded curves into the load history,
    /// and unloaded overlays are dropped.
    pub fn load_curve(&mut self, x: Vec<f64>, y: Vec<f64>, label: &str) -> Result<CurveId> {
        check_lengths(&x, &y)?;
        let old_viewport = self.viewport;

        let had_previous = !self.registry.is_empty();
        let mut previous = None;
        if had_previous {
            let mut displaced = self.registry.set_active_set(Vec::new());
            previous = displaced.pop();
            for curve in displaced {
                if curve.loaded {
                    self.load_history.push(curve);
                }
            }
        }

        let samples = x.len();
        let id = self.registry.register(label, x, y)?;
        if let Some(curve) = self.registry.by_id_mut(id) {
            curve.loaded = true;
        }
        self.autoscale();

        self.push_action(Action::Load {
            previous,
            had_previous,
            loaded: id,
            old_viewport,
            new_viewport: self.viewport,
        });
        self.session
            .add_entry("Load", &format!("{label} ({samples} samples)"));
        log::info!("loaded {label} ({samples} samples) as {id}");
        Ok(id)
    }

    /// Overlay another curve on the current working set.
    pub fn add_curve(&mut self, x: Vec<f64>, y: Vec<f64>, label: &str) -> Result<CurveId> {
        check_lengths(&x, &y)?;
        let old_viewport = self.viewport;
        let prior_added = self.added.last().copied();

        let samples = x.len();
        let id = self.registry.register(label, x, y)?;
        self.autoscale();

        self.push_action(Action::AddPlot {
            prior_added,
            added_id: id,
            added: None,
            old_viewport,
            new_viewport: self.viewport,
        });
        self.added.push(id);
        self.session
            .add_entry("Add Plot", &format!("{label} ({samples} samples)"));
        log::info!("added {label} ({samples} samples) as {id}");
        Ok(id)
    }

    // ── Batch processing ────────────────────────────────────────────────

    /// Run one transform over every visible curve, in registry order,
    /// recording one action per curve.
    ///
    /// Each curve is processed atomically: parameter or input failures abort
    /// the batch before touching the failing curve, leaving earlier curves
    /// transformed and recorded.
    pub fn apply_transform(
        &mut self,
        kind: TransformKind,
        config: &EngineConfig,
    ) -> Result<Vec<ActionRecord>> {
        let ids = self.registry.visible_ids();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(curve) = self.registry.by_id_mut(id) else {
                continue;
            };
            let new_y = match kind {
                TransformKind::Smooth => smooth::savgol_filter(&curve.y_data, &config.smooth)?,
                TransformKind::Baseline => baseline::als_baseline(&curve.y_data, &config.baseline)?,
                TransformKind::NormalizeMinMax => normalize::min_max(&curve.y_data)?,
                TransformKind::NormalizeZ => normalize::z_score(&curve.y_data)?,
            };
            let previous = std::mem::replace(&mut curve.y_data, new_y.clone());
            let action = match kind {
                TransformKind::Smooth => Action::Smooth {
                    curve: id,
                    previous,
                    current: new_y,
                },
                TransformKind::Baseline => Action::Baseline {
                    curve: id,
                    previous,
                    current: new_y,
                },
                TransformKind::NormalizeMinMax => Action::NormalizeMinMax {
                    curve: id,
                    previous,
                    current: new_y,
                },
                TransformKind::NormalizeZ => Action::NormalizeZ {
                    curve: id,
                    previous,
                    current: new_y,
                },
            };
            let record = self.record_for(&action);
            self.push_action(action);
            records.push(record);
        }
        self.autoscale();
        self.session
            .add_entry(&kind.to_string(), &format!("{} curve(s)", records.len()));
        log::info!("{kind}: processed {} curve(s)", records.len());
        Ok(records)
    }

    /// Detect peaks on every visible curve.
    ///
    /// A re-run replaces the curve's existing marker set. Curves where
    /// nothing is found end up without markers and without a record.
    pub fn find_peaks(&mut self, params: &PeakParams) -> Result<Vec<ActionRecord>> {
        let ids = self.registry.visible_ids();
        let mut records = Vec::new();
        for id in ids {
            let Some(curve) = self.registry.by_id_mut(id) else {
                continue;
            };
            let indices = peaks::find_peaks(&curve.y_data, params)?;
            let replaced = curve.detach_peaks();
            if indices.is_empty() {
                if replaced.is_some() {
                    log::debug!("{}: no peaks found, previous marker dropped", curve.label);
                }
                continue;
            }
            let xs = indices.iter().map(|&i| curve.x_data[i]).collect();
            let ys = indices.iter().map(|&i| curve.y_data[i]).collect();
            let count = indices.len();
            let label = curve.label.clone();
            curve.attach_peaks(PeakSet::new(&label, xs, ys));

            let action = Action::Peaks {
                curve: id,
                marker: None,
            };
            let record = self.record_for(&action);
            self.push_action(action);
            records.push(record);
            self.session
                .add_entry("Peaks", &format!("{label}: {count} peak(s)"));
        }
        log::info!("peak detection: {} curve(s) annotated", records.len());
        Ok(records)
    }

    // ── Undo / redo ─────────────────────────────────────────────────────

    /// Reverse the most recent action. `None` when there is nothing to undo
    /// (not an error).
    pub fn undo(&mut self) -> Option<ActionRecord> {
        let mut action = self.undo_stack.pop()?;
        self.reverse(&mut action);
        let record = self.record_for(&action);
        self.session.add_entry("Undo", &action.kind().to_string());
        log::info!("undone: {}", action.kind());
        self.redo_stack.push(action);
        Some(record)
    }

    /// Replay the most recently undone action. `None` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> Option<ActionRecord> {
        let mut action = self.redo_stack.pop()?;
        self.forward(&mut action);
        let record = self.record_for(&action);
        self.session.add_entry("Redo", &action.kind().to_string());
        log::info!("redone: {}", action.kind());
        self.undo_stack.push(action);
        Some(record)
    }

    fn reverse(&mut self, action: &mut Action) {
        match action {
            Action::Load {
                previous,
                had_previous,
                loaded,
                old_viewport,
                ..
            } => {
                // The very first load displaced nothing; undoing it is a
                // stack-only transfer.
                if !*had_previous {
                    return;
                }
                if let Some(current) = self.registry.remove_by_id(*loaded) {
                    self.load_history.push(current);
                }
                if let Some(prev) = previous.take() {
                    self.registry.set_active_set(vec![prev]);
                }
                self.viewport = *old_viewport;
            }
            Action::AddPlot {
                prior_added,
                added_id,
                added,
                old_viewport,
                ..
            } => {
                *added = self.registry.remove_by_id(*added_id);
                log::debug!("undo Add Plot: last-added reverts to {prior_added:?}");
                self.viewport = *old_viewport;
            }
            Action::Smooth { curve, previous, .. }
            | Action::Baseline { curve, previous, .. }
            | Action::NormalizeMinMax { curve, previous, .. }
            | Action::NormalizeZ { curve, previous, .. }
            | Action::Reset { curve, previous, .. } => {
                self.set_curve_y(*curve, previous);
            }
            Action::Peaks { curve, marker } => match self.registry.by_id_mut(*curve) {
                Some(c) => *marker = c.detach_peaks(),
                None => log::warn!("undo Peaks: curve {curve} is no longer active"),
            },
            Action::ReverseX => self.viewport.x_reversed = !self.viewport.x_reversed,
            Action::ReverseY => self.viewport.y_reversed = !self.viewport.y_reversed,
            Action::Label { previous, .. } => {
                self.xlabel = previous.0.clone();
                self.ylabel = previous.1.clone();
            }
            Action::NewManualPeak { .. } => {
                self.manual_peaks.pop();
            }
            Action::DeleteManualPeak { row } => {
                self.manual_peaks.push(row.0, row.1);
            }
            Action::ClearTable { markers, rows } => {
                for (id, slot) in markers.iter_mut() {
                    if let Some(marker) = slot.take() {
                        match self.registry.by_id_mut(*id) {
                            Some(c) => c.attach_peaks(marker),
                            None => {
                                log::warn!("undo Clear Table: curve {id} is no longer active")
                            }
                        }
                    }
                }
                self.manual_peaks.set_rows(rows.clone());
            }
        }
    }

    fn forward(&mut self, action: &mut Action) {
        match action {
            Action::Load {
                previous,
                had_previous,
                loaded,
                new_viewport,
                ..
            } => {
                if !*had_previous {
                    return;
                }
                let displaced = self.registry.set_active_set(Vec::new());
                *previous = displaced.into_iter().next_back();
                if let Some(restored) = self.load_history.pop() {
                    debug_assert_eq!(restored.id, *loaded);
                    if let Err(e) = self.registry.reinsert(restored) {
                        log::warn!("redo Load: {e}");
                    }
                }
                self.viewport = *new_viewport;
            }
            Action::AddPlot {
                added,
                new_viewport,
                ..
            } => {
                if let Some(curve) = added.take() {
                    if let Err(e) = self.registry.reinsert(curve) {
                        log::warn!("redo Add Plot: {e}");
                    }
                }
                self.viewport = *new_viewport;
            }
            Action::Smooth { curve, current, .. }
            | Action::Baseline { curve, current, .. }
            | Action::NormalizeMinMax { curve, current, .. }
            | Action::NormalizeZ { curve, current, .. }
            | Action::Reset { curve, current, .. } => {
                self.set_curve_y(*curve, current);
            }
            Action::Peaks { curve, marker } => match self.registry.by_id_mut(*curve) {
                Some(c) => {
                    if let Some(m) = marker.take() {
                        c.attach_peaks(m);
                    }
                }
                None => log::warn!("redo Peaks: curve {curve} is no longer active"),
            },
            Action::ReverseX => self.viewport.x_reversed = !self.viewport.x_reversed,
            Action::ReverseY => self.viewport.y_reversed = !self.viewport.y_reversed,
            Action::Label { current, .. } => {
                self.xlabel = current.0.clone();
                self.ylabel = current.1.clone();
            }
            Action::NewManualPeak { row } => {
                self.manual_peaks.push(row.0, row.1);
            }
            Action::DeleteManualPeak { .. } => {
                self.manual_peaks.pop();
            }
            Action::ClearTable { markers, .. } => {
                for (id, slot) in markers.iter_mut() {
                    if slot.is_none() {
                        if let Some(c) = self.registry.by_id_mut(*id) {
                            *slot = c.detach_peaks();
                        }
                    }
                }
                self.manual_peaks.take_rows();
            }
        }
    }

    // ── Annotation and display state ────────────────────────────────────

    /// Set a curve's visibility state. Idempotent; not recorded in the undo
    /// log (matching the checkbox behavior it mirrors).
    pub fn set_curve_state(&mut self, label: &str, state: Tristate) -> Result<()> {
        let curve = self
            .registry
            .get_mut(label)
            .ok_or_else(|| EngineError::MissingCurve(label.to_string()))?;
        curve.tristate = state;
        Ok(())
    }

    /// Set both axis labels, recording the change.
    pub fn set_axis_labels(&mut self, xlabel: &str, ylabel: &str) -> ActionRecord {
        let previous = (self.xlabel.clone(), self.ylabel.clone());
        self.xlabel = xlabel.to_string();
        self.ylabel = ylabel.to_string();
        let action = Action::Label {
            previous,
            current: (xlabel.to_string(), ylabel.to_string()),
        };
        let record = self.record_for(&action);
        self.session
            .add_entry("Label", &format!("x = {xlabel:?}, y = {ylabel:?}"));
        self.push_action(action);
        record
    }

    /// Toggle the x-axis orientation. Self-inverse.
    pub fn reverse_x(&mut self) -> ActionRecord {
        self.viewport.x_reversed = !self.viewport.x_reversed;
        let action = Action::ReverseX;
        let record = self.record_for(&action);
        self.session.add_entry("Reverse X", "");
        self.push_action(action);
        record
    }

    /// Toggle the y-axis orientation. Self-inverse.
    pub fn reverse_y(&mut self) -> ActionRecord {
        self.viewport.y_reversed = !self.viewport.y_reversed;
        let action = Action::ReverseY;
        let record = self.record_for(&action);
        self.session.add_entry("Reverse Y", "");
        self.push_action(action);
        record
    }

    /// Append a user-picked peak row.
    pub fn add_manual_peak(&mut self, x: f64, y: f64) -> ActionRecord {
        self.manual_peaks.push(x, y);
        let action = Action::NewManualPeak { row: (x, y) };
        let record = self.record_for(&action);
        self.session
            .add_entry("New Manual Peak", &format!("({x}, {y})"));
        self.push_action(action);
        record
    }

    /// Remove the most recent user-picked peak row.
    pub fn remove_last_manual_peak(&mut self) -> Result<ActionRecord> {
        let row = self.manual_peaks.pop().ok_or(EngineError::EmptyTable)?;
        let action = Action::DeleteManualPeak { row };
        let record = self.record_for(&action);
        self.session
            .add_entry("Delete Manual Peak", &format!("({}, {})", row.0, row.1));
        self.push_action(action);
        Ok(record)
    }

    /// Detach every detected marker and empty the manual peak table, in one
    /// recorded action.
    pub fn clear_peak_table(&mut self) -> ActionRecord {
        let mut markers = Vec::new();
        for curve in self.registry.iter_mut() {
            if let Some(marker) = curve.detach_peaks() {
                markers.push((curve.id, Some(marker)));
            }
        }
        let rows = self.manual_peaks.take_rows();
        self.session.add_entry(
            "Clear Table",
            &format!("{} marker set(s), {} manual row(s)", markers.len(), rows.len()),
        );
        let action = Action::ClearTable { markers, rows };
        let record = self.record_for(&action);
        self.push_action(action);
        record
    }

    /// Restore a curve's y-data to its as-loaded snapshot, recorded like a
    /// transform.
    pub fn reset_curve(&mut self, label: &str) -> Result<ActionRecord> {
        let (id, previous, current) = {
            let curve = self
                .registry
                .get_mut(label)
                .ok_or_else(|| EngineError::MissingCurve(label.to_string()))?;
            let current = curve.y_orig.clone();
            let previous = std::mem::replace(&mut curve.y_data, current.clone());
            (curve.id, previous, current)
        };
        self.autoscale();
        let action = Action::Reset {
            curve: id,
            previous,
            current,
        };
        let record = self.record_for(&action);
        self.session.add_entry("Reset", label);
        self.push_action(action);
        Ok(record)
    }

    /// Shift every visible curve by a constant along one axis. Mirrors the
    /// spinbox nudge of the host UI; like that control, it is not part of
    /// the undo log.
    pub fn shift_visible(&mut self, axis: Axis, delta: f64) {
        for curve in self.registry.visible_mut() {
            let data = match axis {
                Axis::X => &mut curve.x_data,
                Axis::Y => &mut curve.y_data,
            };
            for v in data.iter_mut() {
                *v += delta;
            }
        }
        self.autoscale();
        self.session
            .add_entry("Shift", &format!("{axis:?} by {delta}"));
    }

    // ── Export and accessors ────────────────────────────────────────────

    pub fn export_curve(&self, label: &str) -> Result<CurveExport> {
        let curve = self
            .registry
            .get(label)
            .ok_or_else(|| EngineError::MissingCurve(label.to_string()))?;
        Ok(CurveExport::from(curve))
    }

    /// One export per visible curve, in registry order.
    pub fn export_visible(&self) -> Vec<CurveExport> {
        self.registry.visible().map(CurveExport::from).collect()
    }

    pub fn curve(&self, label: &str) -> Option<&Curve> {
        self.registry.get(label)
    }

    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.registry.iter()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn axis_labels(&self) -> (&str, &str) {
        (&self.xlabel, &self.ylabel)
    }

    pub fn manual_peaks(&self) -> &ManualPeakTable {
        &self.manual_peaks
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn session(&self) -> &SessionLog {
        &self.session
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Append a fresh action, invalidating everything that was undone.
    fn push_action(&mut self, action: Action) {
        if !self.redo_stack.is_empty() {
            log::debug!(
                "new {} action discards {} redo entries",
                action.kind(),
                self.redo_stack.len()
            );
            self.redo_stack.clear();
        }
        self.undo_stack.push(action);
    }

    fn record_for(&self, action: &Action) -> ActionRecord {
        let curve = action.curve_id();
        let label = curve
            .and_then(|id| self.registry.by_id(id))
            .map(|c| c.label.clone());
        ActionRecord {
            kind: action.kind(),
            curve,
            label,
        }
    }

    fn set_curve_y(&mut self, id: CurveId, y: &[f64]) {
        match self.registry.by_id_mut(id) {
            Some(curve) => curve.y_data = y.to_vec(),
            None => log::warn!("curve {id} is no longer active; y restore skipped"),
        }
    }

    fn autoscale(&mut self) {
        self.viewport.autoscale(self.registry.visible());
    }
}

impl Default for SpectraEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn check_lengths(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(EngineError::invalid(
            "y",
            format!("x and y lengths differ ({} vs {})", x.len(), y.len()),
        ));
    }
    Ok(())
}
