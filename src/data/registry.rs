use crate::error::{EngineError, Result};

use super::curve::{Curve, CurveId, Tristate};

/// Owner of all active curves.
///
/// Curves are stored in insertion order (table display and batch processing
/// both iterate in that order) and looked up by label or id. Ids come from a
/// registry-owned monotonic counter and are never reused, so an id remains a
/// valid reference to a parked curve even after eviction.
#[derive(Debug, Default)]
pub struct CurveRegistry {
    curves: Vec<Curve>,
    next_id: u64,
}

impl CurveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and insert a new curve, assigning the next id.
    ///
    /// Fails with [`EngineError::DuplicateLabel`] when a curve with the same
    /// label is already active; the counter is not advanced in that case.
    pub fn register(&mut self, label: &str, x_data: Vec<f64>, y_data: Vec<f64>) -> Result<CurveId> {
        if self.get(label).is_some() {
            return Err(EngineError::DuplicateLabel(label.to_string()));
        }
        let id = CurveId(self.next_id);
        self.next_id += 1;
        self.curves.push(Curve::new(id, label, x_data, y_data));
        Ok(id)
    }

    /// Re-insert a curve that already carries an id (undo/redo paths).
    pub fn reinsert(&mut self, curve: Curve) -> Result<()> {
        if self.get(&curve.label).is_some() {
            return Err(EngineError::DuplicateLabel(curve.label.clone()));
        }
        self.curves.push(curve);
        Ok(())
    }

    /// Evict and return the curve with the given label.
    pub fn remove(&mut self, label: &str) -> Option<Curve> {
        let pos = self.curves.iter().position(|c| c.label == label)?;
        Some(self.curves.remove(pos))
    }

    pub fn remove_by_id(&mut self, id: CurveId) -> Option<Curve> {
        let pos = self.curves.iter().position(|c| c.id == id)?;
        Some(self.curves.remove(pos))
    }

    pub fn get(&self, label: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.label == label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Curve> {
        self.curves.iter_mut().find(|c| c.label == label)
    }

    pub fn by_id(&self, id: CurveId) -> Option<&Curve> {
        self.curves.iter().find(|c| c.id == id)
    }

    pub fn by_id_mut(&mut self, id: CurveId) -> Option<&mut Curve> {
        self.curves.iter_mut().find(|c| c.id == id)
    }

    /// All active curves, insertion-ordered.
    pub fn iter(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Curve> {
        self.curves.iter_mut()
    }

    /// Curves participating in batch operations, insertion-ordered.
    pub fn visible(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter().filter(|c| c.tristate == Tristate::Visible)
    }

    pub fn visible_mut(&mut self) -> impl Iterator<Item = &mut Curve> {
        self.curves
            .iter_mut()
            .filter(|c| c.tristate == Tristate::Visible)
    }

    /// Ids of the visible curves, snapshot in iteration order.
    pub fn visible_ids(&self) -> Vec<CurveId> {
        self.visible().map(|c| c.id).collect()
    }

    /// Replace the whole working set in one step, returning the curves it
    /// previously held. Nothing is dropped or inserted until the swap, so a
    /// caller never observes a half-replaced registry.
    pub fn set_active_set(&mut self, curves: Vec<Curve>) -> Vec<Curve> {
        std::mem::replace(&mut self.curves, curves)
    }

    pub fn last(&self) -> Option<&Curve> {
        self.curves.last()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut reg = CurveRegistry::new();
        let a = reg.register("a", vec![0.0], vec![1.0]).unwrap();
        let b = reg.register("b", vec![0.0], vec![1.0]).unwrap();
        assert!(b > a);
        reg.remove("b").unwrap();
        let c = reg.register("c", vec![0.0], vec![1.0]).unwrap();
        assert!(c > b);
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let mut reg = CurveRegistry::new();
        reg.register("a", vec![0.0], vec![1.0]).unwrap();
        let err = reg.register("a", vec![0.0], vec![2.0]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateLabel(_)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn visible_iteration_follows_insertion_order() {
        let mut reg = CurveRegistry::new();
        reg.register("first", vec![0.0], vec![1.0]).unwrap();
        reg.register("second", vec![0.0], vec![1.0]).unwrap();
        reg.register("third", vec![0.0], vec![1.0]).unwrap();
        reg.get_mut("second").unwrap().tristate = Tristate::Hidden;

        let labels: Vec<&str> = reg.visible().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "third"]);
    }

    #[test]
    fn set_active_set_swaps_everything() {
        let mut reg = CurveRegistry::new();
        reg.register("old", vec![0.0], vec![1.0]).unwrap();
        let displaced = reg.set_active_set(Vec::new());
        assert_eq!(displaced.len(), 1);
        assert!(reg.is_empty());

        reg.reinsert(displaced.into_iter().next().unwrap()).unwrap();
        assert_eq!(reg.get("old").unwrap().label, "old");
    }

    #[test]
    fn eviction_returns_ownership() {
        let mut reg = CurveRegistry::new();
        let id = reg.register("gone", vec![0.0], vec![1.0]).unwrap();
        let curve = reg.remove("gone").unwrap();
        assert_eq!(curve.id, id);
        assert!(reg.by_id(id).is_none());
    }
}
