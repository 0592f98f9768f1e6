//! Local-maxima peak detection with height, threshold, distance, prominence
//! and width constraints.

use crate::config::{Limit, PeakParams};
use crate::error::{EngineError, Result};

/// Prominence of one peak and the valley positions bounding it.
#[derive(Debug, Clone, Copy)]
struct Prominence {
    value: f64,
    left_base: usize,
    right_base: usize,
}

/// Find the indices of all local maxima in `y` satisfying `params`.
///
/// Results are strictly increasing sample indices. A flat-topped peak
/// reports the midpoint of its plateau. Filters apply in the order height,
/// threshold, distance, prominence, width; the distance pass keeps the
/// taller of two conflicting peaks.
pub fn find_peaks(y: &[f64], params: &PeakParams) -> Result<Vec<usize>> {
    if let Some(d) = params.distance {
        if !(d >= 1.0) {
            return Err(EngineError::invalid(
                "distance",
                format!("must be at least 1 sample, got {d}"),
            ));
        }
    }

    let mut peaks = local_maxima(y);

    if let Some(height) = params.height {
        peaks.retain(|&p| height.contains(y[p]));
    }

    if let Some(threshold) = params.threshold {
        peaks.retain(|&p| {
            let left = y[p] - y[p - 1];
            let right = y[p] - y[p + 1];
            match threshold {
                Limit::Min(lo) => left.min(right) >= lo,
                Limit::Between(lo, hi) => left.min(right) >= lo && left.max(right) <= hi,
            }
        });
    }

    if let Some(distance) = params.distance {
        let keep = select_by_distance(&peaks, y, distance);
        peaks = peaks
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();
    }

    if params.prominence.is_some() || params.width.is_some() {
        let mut proms: Vec<Prominence> = peaks.iter().map(|&p| prominence(y, p)).collect();

        if let Some(limit) = params.prominence {
            let mut kept_peaks = Vec::with_capacity(peaks.len());
            let mut kept_proms = Vec::with_capacity(proms.len());
            for (p, pr) in peaks.into_iter().zip(proms) {
                if limit.contains(pr.value) {
                    kept_peaks.push(p);
                    kept_proms.push(pr);
                }
            }
            peaks = kept_peaks;
            proms = kept_proms;
        }

        if let Some(limit) = params.width {
            peaks = peaks
                .into_iter()
                .zip(proms)
                .filter_map(|(p, pr)| limit.contains(half_prominence_width(y, p, &pr)).then_some(p))
                .collect();
        }
    }

    Ok(peaks)
}

/// Plateau-aware local maxima: a sample (or flat run) strictly above both
/// neighbours. Boundary samples never qualify.
fn local_maxima(y: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if y.len() < 3 {
        return peaks;
    }
    let i_max = y.len() - 1;
    let mut i = 1;
    while i < i_max {
        if y[i - 1] < y[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && y[i_ahead] == y[i] {
                i_ahead += 1;
            }
            if y[i_ahead] < y[i] {
                // midpoint of the plateau [i, i_ahead - 1]
                peaks.push((i + i_ahead - 1) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Distance pass: walking from the tallest candidate down, suppress every
/// other candidate closer than `distance` samples.
fn select_by_distance(peaks: &[usize], y: &[f64], distance: f64) -> Vec<bool> {
    let d = distance.ceil() as usize;
    let m = peaks.len();
    let mut keep = vec![true; m];
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| y[peaks[a]].total_cmp(&y[peaks[b]]));
    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < d {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < m && peaks[k] - peaks[j] < d {
            keep[k] = false;
            k += 1;
        }
    }
    keep
}

/// Vertical drop from the peak to the higher of the two valleys separating
/// it from taller terrain (or the signal edge).
fn prominence(y: &[f64], peak: usize) -> Prominence {
    let n = y.len();

    let mut left_min = y[peak];
    let mut left_base = peak;
    let mut i = peak;
    while y[i] <= y[peak] {
        if y[i] < left_min {
            left_min = y[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = y[peak];
    let mut right_base = peak;
    let mut i = peak;
    while y[i] <= y[peak] {
        if y[i] < right_min {
            right_min = y[i];
            right_base = i;
        }
        if i == n - 1 {
            break;
        }
        i += 1;
    }

    Prominence {
        value: y[peak] - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// Peak width in samples, measured where the flanks cross
/// `y[peak] - prominence / 2`, with linear interpolation between samples.
fn half_prominence_width(y: &[f64], peak: usize, prom: &Prominence) -> f64 {
    let height = y[peak] - prom.value * 0.5;

    let mut i = peak;
    while i > prom.left_base && height < y[i] {
        i -= 1;
    }
    let mut left_ip = i as f64;
    if y[i] < height {
        left_ip += (height - y[i]) / (y[i + 1] - y[i]);
    }

    let mut i = peak;
    while i < prom.right_base && height < y[i] {
        i += 1;
    }
    let mut right_ip = i as f64;
    if y[i] < height {
        right_ip -= (height - y[i]) / (y[i - 1] - y[i]);
    }

    right_ip - left_ip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PeakParams {
        PeakParams::default()
    }

    #[test]
    fn alternating_signal_with_height_and_distance() {
        let y = vec![0.0, 1.0, 0.0, 1.0, 0.0];
        let p = PeakParams {
            height: Some(Limit::Min(0.5)),
            distance: Some(1.0),
            ..params()
        };
        assert_eq!(find_peaks(&y, &p).unwrap(), vec![1, 3]);
    }

    #[test]
    fn indices_are_increasing_and_in_bounds() {
        let y: Vec<f64> = (0..120).map(|i| (i as f64 * 0.37).sin() * (i as f64 * 0.05).cos()).collect();
        let found = find_peaks(&y, &params()).unwrap();
        assert!(!found.is_empty());
        for pair in found.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(found.iter().all(|&p| p < y.len()));
    }

    #[test]
    fn boundary_samples_are_never_peaks() {
        let y = vec![5.0, 1.0, 0.5, 1.0, 5.0];
        let found = find_peaks(&y, &params()).unwrap();
        assert_eq!(found, Vec::<usize>::new());
    }

    #[test]
    fn plateau_reports_midpoint() {
        let y = vec![0.0, 1.0, 2.0, 2.0, 2.0, 1.0, 0.0];
        assert_eq!(find_peaks(&y, &params()).unwrap(), vec![3]);
    }

    #[test]
    fn flat_signal_has_no_peaks() {
        let y = vec![1.0; 10];
        assert_eq!(find_peaks(&y, &params()).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn distance_keeps_the_taller_peak() {
        let y = vec![0.0, 2.0, 0.5, 3.0, 0.0];
        let p = PeakParams {
            distance: Some(3.0),
            ..params()
        };
        assert_eq!(find_peaks(&y, &p).unwrap(), vec![3]);
    }

    #[test]
    fn distance_below_one_is_rejected() {
        let y = vec![0.0, 1.0, 0.0];
        let p = PeakParams {
            distance: Some(0.5),
            ..params()
        };
        assert!(find_peaks(&y, &p).is_err());
    }

    #[test]
    fn threshold_requires_vertical_step() {
        let y = vec![0.0, 1.0, 0.9, 3.0, 0.0];
        // peak at 1 rises only 0.1 above its right neighbour
        let p = PeakParams {
            threshold: Some(Limit::Min(0.5)),
            ..params()
        };
        assert_eq!(find_peaks(&y, &p).unwrap(), vec![3]);
    }

    #[test]
    fn prominence_ignores_ripples_on_a_slope() {
        // small bump riding a tall shoulder has low prominence
        let y = vec![0.0, 5.0, 4.0, 4.2, 4.0, 1.0, 3.0, 0.0];
        let p = PeakParams {
            prominence: Some(Limit::Min(1.0)),
            ..params()
        };
        let found = find_peaks(&y, &p).unwrap();
        assert_eq!(found, vec![1, 6]);
    }

    #[test]
    fn width_filter_separates_narrow_from_broad() {
        let mut y = vec![0.0; 41];
        // narrow spike
        y[10] = 4.0;
        // broad peak
        for (offset, v) in [1.0, 2.5, 3.5, 4.0, 3.5, 2.5, 1.0].iter().enumerate() {
            y[27 + offset] = *v;
        }
        let narrow = PeakParams {
            width: Some(Limit::Between(0.0, 2.0)),
            ..params()
        };
        assert_eq!(find_peaks(&y, &narrow).unwrap(), vec![10]);
        let broad = PeakParams {
            width: Some(Limit::Min(2.0)),
            ..params()
        };
        assert_eq!(find_peaks(&y, &broad).unwrap(), vec![30]);
    }

    #[test]
    fn height_accepts_bounds_pair() {
        let y = vec![0.0, 1.0, 0.0, 4.0, 0.0, 9.0, 0.0];
        let p = PeakParams {
            height: Some(Limit::Between(2.0, 5.0)),
            ..params()
        };
        assert_eq!(find_peaks(&y, &p).unwrap(), vec![3]);
    }
}
