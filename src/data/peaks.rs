use serde::{Deserialize, Serialize};

/// Marker set produced by one peak-finding run over one curve.
///
/// Positions are fixed at creation; a re-run replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    x_positions: Vec<f64>,
    y_positions: Vec<f64>,
    display_name: String,
}

impl PeakSet {
    pub fn new(curve_label: &str, x_positions: Vec<f64>, y_positions: Vec<f64>) -> Self {
        Self {
            x_positions,
            y_positions,
            display_name: format!("peak_{curve_label}"),
        }
    }

    pub fn x_positions(&self) -> &[f64] {
        &self.x_positions
    }

    pub fn y_positions(&self) -> &[f64] {
        &self.y_positions
    }

    /// Row-correlation name for table hosts: `peak_<curve label>`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn len(&self) -> usize {
        self.x_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_positions.is_empty()
    }
}

impl std::fmt::Display for PeakSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// User-picked (x, y) annotation rows, independent of detected peaks.
///
/// Insertion-ordered; only the tail may be removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualPeakTable {
    rows: Vec<(f64, f64)>,
}

impl ManualPeakTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.rows.push((x, y));
    }

    pub fn pop(&mut self) -> Option<(f64, f64)> {
        self.rows.pop()
    }

    pub fn rows(&self) -> &[(f64, f64)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Empty the table, returning the rows it held.
    pub fn take_rows(&mut self) -> Vec<(f64, f64)> {
        std::mem::take(&mut self.rows)
    }

    pub fn set_rows(&mut self, rows: Vec<(f64, f64)>) {
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_derives_from_label() {
        let pks = PeakSet::new("sample_a", vec![1.0, 2.0], vec![0.5, 0.7]);
        assert_eq!(pks.display_name(), "peak_sample_a");
        assert_eq!(pks.len(), 2);
    }

    #[test]
    fn manual_table_is_a_stack_at_the_tail() {
        let mut table = ManualPeakTable::new();
        table.push(1.0, 10.0);
        table.push(2.0, 20.0);
        assert_eq!(table.pop(), Some((2.0, 20.0)));
        assert_eq!(table.rows(), &[(1.0, 10.0)]);
        assert_eq!(table.pop(), Some((1.0, 10.0)));
        assert_eq!(table.pop(), None);
    }

    #[test]
    fn take_rows_empties_the_table() {
        let mut table = ManualPeakTable::new();
        table.push(3.0, 30.0);
        let rows = table.take_rows();
        assert_eq!(rows, vec![(3.0, 30.0)]);
        assert!(table.is_empty());
    }
}
