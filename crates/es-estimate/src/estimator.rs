//! Distribution estimation over a trajectory ensemble.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use es_core::{Ensemble, Error, LatticeBounds, Result};
use es_lattice::{cells, linearize};

/// Safety bound for the full joint distribution: lattices with more bins than
/// this are rejected instead of allocating unbounded memory.
pub const DEFAULT_MAX_FULL_JOINT_BINS: usize = 1 << 24;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A 2D joint histogram over the first two species.
///
/// Stored as the codec-order linear histogram: axis 0 is the fastest-varying
/// axis (column-major), element `(i0, i1)` lives at `values[i0 + n0 * i1]`.
/// This matches the combinatorial-index convention exactly, so the linear
/// vector and its matrix view can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint2d {
    /// Size of axis 0 (rows of the matrix view).
    pub n0: usize,
    /// Size of axis 1 (columns of the matrix view).
    pub n1: usize,
    /// Linear histogram of length `n0 * n1`, axis 0 fastest.
    pub values: Vec<f64>,
}

impl Joint2d {
    /// Element at matrix position `(i0, i1)`.
    #[inline]
    pub fn at(&self, i0: usize, i1: usize) -> f64 {
        debug_assert!(i0 < self.n0 && i1 < self.n1);
        self.values[i0 + self.n0 * i1]
    }
}

/// Distributions of one sampling time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeDistributions {
    /// Per-species marginal histograms; each sums to 1.
    pub marginals: Vec<Vec<f64>>,
    /// Joint marginal over species {0, 1}; sums to 1. `None` for 1-D systems.
    pub marginal2d: Option<Joint2d>,
    /// Per-species sliced distributions: exact-match counts of the full state
    /// vector with one species varied, divided by the total run count.
    ///
    /// These are joint-count fractions, NOT conditional probabilities; they do
    /// not sum to 1 across the varied axis and must not be renormalized.
    pub sliced: Vec<Vec<f64>>,
    /// Sliced joint over species {0, 1} with the rest pinned to the reference
    /// state; same count/`n_runs` scaling as `sliced`. `None` for 1-D systems.
    pub sliced2d: Option<Joint2d>,
}

/// Distributions of every sampling time, plus the bounds they live on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSet {
    /// Observed lattice bounds of the underlying ensemble.
    pub bounds: LatticeBounds,
    /// Total number of runs in the underlying ensemble.
    pub n_runs: usize,
    /// One entry per sampling time, in time order.
    pub times: Vec<TimeDistributions>,
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Distribution estimator over a raw trajectory ensemble.
///
/// Construction computes the observed bounding box: per-species minimum and
/// maximum population across all runs and times, `n[k] = n_max[k] - n_min[k]
/// + 1`. A population value never observed anywhere in the ensemble is
/// invisible to the resulting distributions.
#[derive(Debug)]
pub struct EnsembleDistributions {
    ensemble: Ensemble,
    bounds: LatticeBounds,
}

impl EnsembleDistributions {
    /// Take ownership of an ensemble and compute its observed bounds.
    pub fn new(ensemble: Ensemble) -> Self {
        let bounds = LatticeBounds::observed(&ensemble);
        Self { ensemble, bounds }
    }

    /// Observed lattice bounds.
    pub fn bounds(&self) -> &LatticeBounds {
        &self.bounds
    }

    /// The underlying ensemble.
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Estimate marginal and sliced distributions for every sampling time.
    ///
    /// `slice_vec` is the conditioning point of the sliced distributions, in
    /// codec-relative coordinates (offset-subtracted, each digit in
    /// `[0, n[k])`); it is held constant across the whole pass. Times are
    /// independent reductions over the read-only ensemble and run in parallel.
    pub fn estimate(&self, slice_vec: &[usize]) -> Result<DistributionSet> {
        let n = self.bounds.n();
        if slice_vec.len() != n.len() {
            return Err(Error::Domain(format!(
                "reference state has {} digits, ensemble has {} species",
                slice_vec.len(),
                n.len()
            )));
        }
        for (k, (&digit, &size)) in slice_vec.iter().zip(n).enumerate() {
            if digit >= size {
                return Err(Error::Domain(format!(
                    "reference digit {digit} of dimension {k} outside [0, {size})"
                )));
            }
        }

        let times = (0..self.ensemble.n_time())
            .into_par_iter()
            .map(|t| self.estimate_time(t, slice_vec))
            .collect::<Result<Vec<_>>>()?;

        Ok(DistributionSet { bounds: self.bounds.clone(), n_runs: self.ensemble.n_runs(), times })
    }

    /// Full joint distribution per sampling time, guarded by
    /// [`DEFAULT_MAX_FULL_JOINT_BINS`].
    ///
    /// Each entry is a `prod(n)`-bin histogram in combinatorial-index order,
    /// divided by the run count. Only feasible for small systems; wide or
    /// high-dimensional lattices are rejected.
    pub fn full_joint(&self) -> Result<Vec<Vec<f64>>> {
        self.full_joint_bounded(DEFAULT_MAX_FULL_JOINT_BINS)
    }

    /// Full joint distribution with a caller-supplied bin-count bound.
    pub fn full_joint_bounded(&self, max_bins: usize) -> Result<Vec<Vec<f64>>> {
        let dx = self.bounds.n_cells()?;
        if dx > max_bins {
            return Err(Error::Domain(format!(
                "full joint over lattice {:?} needs {dx} bins, exceeding the bound of {max_bins}",
                self.bounds.n()
            )));
        }
        let n_runs = self.ensemble.n_runs();
        (0..self.ensemble.n_time())
            .into_par_iter()
            .map(|t| {
                let mut hist = vec![0.0f64; dx];
                let mut digits = vec![0usize; self.bounds.dims()];
                for run in 0..n_runs {
                    let index = self.linearize_state(run, t, &mut digits)?;
                    hist[index] += 1.0;
                }
                for value in &mut hist {
                    *value /= n_runs as f64;
                }
                Ok(hist)
            })
            .collect()
    }

    // -- per-time reduction -------------------------------------------------

    fn estimate_time(&self, t: usize, slice_vec: &[usize]) -> Result<TimeDistributions> {
        let n = self.bounds.n();
        let m = self.bounds.dims();
        let n_runs = self.ensemble.n_runs();

        let mut marginal_counts: Vec<Vec<u64>> = n.iter().map(|&size| vec![0u64; size]).collect();
        let mut joint2d_counts = (m >= 2).then(|| vec![0u64; n[0] * n[1]]);
        // Exact-match table: full-state combinatorial index -> run count.
        // Computed once per time, shared by every sliced sweep.
        let mut full_counts: HashMap<usize, u64> = HashMap::new();

        let mut digits = vec![0usize; m];
        for run in 0..n_runs {
            let full_index = self.linearize_state(run, t, &mut digits)?;
            for (k, &digit) in digits.iter().enumerate() {
                marginal_counts[k][digit] += 1;
            }
            if let Some(counts) = joint2d_counts.as_mut() {
                counts[linearize(&digits[..2], &n[..2])?] += 1;
            }
            *full_counts.entry(full_index).or_insert(0) += 1;
        }

        let marginals = marginal_counts
            .into_iter()
            .enumerate()
            .map(|(k, counts)| normalize(counts, || format!("species {k} at time index {t}")))
            .collect::<Result<Vec<_>>>()?;

        let marginal2d = joint2d_counts
            .map(|counts| {
                let values =
                    normalize(counts, || format!("2D joint marginal at time index {t}"))?;
                Ok::<_, Error>(Joint2d { n0: n[0], n1: n[1], values })
            })
            .transpose()?;

        // Sliced sweeps: vary one species (or the first pair) while holding
        // the remaining species pinned at the reference state, and look up the
        // exact-match count of the resulting full state.
        let count_of = |index: usize| full_counts.get(&index).copied().unwrap_or(0);

        let mut comp_vec = slice_vec.to_vec();
        let mut sliced = Vec::with_capacity(m);
        for k in 0..m {
            let mut histogram = vec![0.0f64; n[k]];
            for (v, value) in histogram.iter_mut().enumerate() {
                comp_vec[k] = v;
                *value = count_of(linearize(&comp_vec, n)?) as f64 / n_runs as f64;
            }
            comp_vec[k] = slice_vec[k];
            sliced.push(histogram);
        }

        let sliced2d = if m >= 2 {
            let mut values = Vec::with_capacity(n[0] * n[1]);
            for pair in cells(&n[..2])? {
                comp_vec[0] = pair[0];
                comp_vec[1] = pair[1];
                values.push(count_of(linearize(&comp_vec, n)?) as f64 / n_runs as f64);
            }
            comp_vec[0] = slice_vec[0];
            comp_vec[1] = slice_vec[1];
            Some(Joint2d { n0: n[0], n1: n[1], values })
        } else {
            None
        };

        Ok(TimeDistributions { marginals, marginal2d, sliced, sliced2d })
    }

    /// Shift the raw state of `(run, t)` into codec-relative digits (written
    /// into `digits`) and return its combinatorial index.
    #[inline]
    fn linearize_state(&self, run: usize, t: usize, digits: &mut [usize]) -> Result<usize> {
        let state = self.ensemble.state(run, t);
        for (k, &x) in state.iter().enumerate() {
            digits[k] = (x - self.bounds.n_min()[k]) as usize;
        }
        linearize(digits, self.bounds.n())
    }
}

/// Normalize a count histogram into a distribution summing to 1.
fn normalize(counts: Vec<u64>, context: impl Fn() -> String) -> Result<Vec<f64>> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return Err(Error::DegenerateDistribution(format!(
            "histogram of {} has zero total mass",
            context()
        )));
    }
    Ok(counts.into_iter().map(|c| c as f64 / total as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_time_ensemble(states: &[&[i64]]) -> Ensemble {
        let m = states[0].len();
        let data: Vec<i64> = states.iter().flat_map(|s| s.iter().copied()).collect();
        Ensemble::from_raw(data, states.len(), 1, m).unwrap()
    }

    #[test]
    fn test_1d_marginal_uniform_thirds() {
        let e = one_time_ensemble(&[&[0], &[0], &[1], &[1], &[2], &[2]]);
        let est = EnsembleDistributions::new(e);
        let set = est.estimate(&[0]).unwrap();
        let marginal = &set.times[0].marginals[0];
        assert_eq!(marginal.len(), 3);
        for &p in marginal {
            assert_relative_eq!(p, 1.0 / 3.0, max_relative = 1e-12);
        }
        assert!(set.times[0].marginal2d.is_none());
        assert!(set.times[0].sliced2d.is_none());
    }

    #[test]
    fn test_marginals_respect_offsets() {
        // Values live on [5, 7]; the histogram is over shifted digits.
        let e = one_time_ensemble(&[&[5], &[6], &[6], &[7]]);
        let est = EnsembleDistributions::new(e);
        assert_eq!(est.bounds().n_min(), &[5]);
        let set = est.estimate(&[0]).unwrap();
        let marginal = &set.times[0].marginals[0];
        assert_relative_eq!(marginal[0], 0.25, max_relative = 1e-12);
        assert_relative_eq!(marginal[1], 0.5, max_relative = 1e-12);
        assert_relative_eq!(marginal[2], 0.25, max_relative = 1e-12);
    }

    #[test]
    fn test_2d_joint_marginal_uniform_quarters() {
        // All four combinations of {0,1} x {0,1}, equal counts.
        let e = one_time_ensemble(&[&[0, 0], &[1, 0], &[0, 1], &[1, 1]]);
        let est = EnsembleDistributions::new(e);
        let set = est.estimate(&[0, 0]).unwrap();
        let joint = set.times[0].marginal2d.as_ref().unwrap();
        assert_eq!((joint.n0, joint.n1), (2, 2));
        let total: f64 = joint.values.iter().sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-12);
        for i0 in 0..2 {
            for i1 in 0..2 {
                assert_relative_eq!(joint.at(i0, i1), 0.25, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_2d_joint_axis0_fastest() {
        // Three runs at (1, 0), one at (0, 1): linear index 1 holds 0.75.
        let e = one_time_ensemble(&[&[1, 0], &[1, 0], &[1, 0], &[0, 1]]);
        let est = EnsembleDistributions::new(e);
        let set = est.estimate(&[0, 0]).unwrap();
        let joint = set.times[0].marginal2d.as_ref().unwrap();
        assert_relative_eq!(joint.values[1], 0.75, max_relative = 1e-12);
        assert_relative_eq!(joint.values[2], 0.25, max_relative = 1e-12);
        assert_relative_eq!(joint.at(1, 0), 0.75, max_relative = 1e-12);
        assert_relative_eq!(joint.at(0, 1), 0.25, max_relative = 1e-12);
    }

    #[test]
    fn test_sliced_counts_joint_fractions() {
        // Two species, three runs: (0,0), (0,1), (1,1).
        let e = one_time_ensemble(&[&[0, 0], &[0, 1], &[1, 1]]);
        let est = EnsembleDistributions::new(e);
        let set = est.estimate(&[0, 0]).unwrap();
        let td = &set.times[0];
        // Vary species 0 with species 1 pinned at 0: only (0,0) matches.
        assert_relative_eq!(td.sliced[0][0], 1.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(td.sliced[0][1], 0.0, max_relative = 1e-12);
        // Vary species 1 with species 0 pinned at 0: (0,0) and (0,1).
        assert_relative_eq!(td.sliced[1][0], 1.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(td.sliced[1][1], 1.0 / 3.0, max_relative = 1e-12);
        // Sliced values are joint-count fractions; the per-axis sums stay <= 1.
        let sum0: f64 = td.sliced[0].iter().sum();
        let sum1: f64 = td.sliced[1].iter().sum();
        assert!(sum0 <= 1.0 + 1e-12);
        assert!(sum1 <= 1.0 + 1e-12);
    }

    #[test]
    fn test_full_sweep_of_sliced_joint_bounded_by_one() {
        // Three species; sweeping all of them at once is the full joint, so the
        // 2D sliced sweep (two axes varied, one pinned) must stay <= 1.
        let e = one_time_ensemble(&[&[0, 0, 0], &[1, 0, 0], &[0, 1, 1], &[1, 1, 1]]);
        let est = EnsembleDistributions::new(e);
        let set = est.estimate(&[0, 0, 0]).unwrap();
        let sliced2d = set.times[0].sliced2d.as_ref().unwrap();
        let sum: f64 = sliced2d.values.iter().sum();
        assert!(sum <= 1.0 + 1e-12, "sliced joint sum {sum} exceeds 1");
        // Only the states with species 2 == 0 are counted here.
        assert_relative_eq!(sum, 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_sliced2d_matches_manual_count() {
        let e = one_time_ensemble(&[&[0, 0, 0], &[1, 1, 0], &[1, 1, 0], &[0, 0, 1]]);
        let est = EnsembleDistributions::new(e);
        let set = est.estimate(&[0, 0, 0]).unwrap();
        let sliced2d = set.times[0].sliced2d.as_ref().unwrap();
        assert_relative_eq!(sliced2d.at(0, 0), 0.25, max_relative = 1e-12);
        assert_relative_eq!(sliced2d.at(1, 1), 0.5, max_relative = 1e-12);
        assert_relative_eq!(sliced2d.at(1, 0), 0.0, max_relative = 1e-12);
    }

    #[test]
    fn test_reference_state_validated() {
        let e = one_time_ensemble(&[&[0], &[1]]);
        let est = EnsembleDistributions::new(e);
        assert!(est.estimate(&[2]).is_err());
        assert!(est.estimate(&[0, 0]).is_err());
    }

    #[test]
    fn test_full_joint_small_system() {
        let e = one_time_ensemble(&[&[0, 0], &[1, 1], &[1, 1], &[0, 1]]);
        let est = EnsembleDistributions::new(e);
        let full = est.full_joint().unwrap();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].len(), 4);
        assert_relative_eq!(full[0][0], 0.25, max_relative = 1e-12);
        assert_relative_eq!(full[0][3], 0.5, max_relative = 1e-12);
        let total: f64 = full[0].iter().sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_full_joint_rejects_oversized_lattice() {
        // Observed ranges of ~5001 per species give ~2.5e7 bins.
        let e = one_time_ensemble(&[&[0, 0], &[5000, 5000]]);
        let est = EnsembleDistributions::new(e);
        let err = est.full_joint().unwrap_err();
        assert!(matches!(err, Error::Domain(_)), "unexpected error: {err}");
    }

    #[test]
    fn test_full_joint_bound_is_caller_overridable() {
        let e = one_time_ensemble(&[&[0, 0], &[1, 1]]);
        let est = EnsembleDistributions::new(e);
        assert!(est.full_joint_bounded(2).is_err());
        assert!(est.full_joint_bounded(4).is_ok());
    }

    #[test]
    fn test_estimates_are_reproducible() {
        let e = one_time_ensemble(&[&[0, 2], &[1, 0], &[3, 1], &[1, 1], &[2, 2]]);
        let est = EnsembleDistributions::new(e);
        let a = est.estimate(&[1, 1]).unwrap();
        let b = est.estimate(&[1, 1]).unwrap();
        for (ta, tb) in a.times.iter().zip(&b.times) {
            assert_eq!(ta.marginals, tb.marginals);
            assert_eq!(ta.marginal2d, tb.marginal2d);
            assert_eq!(ta.sliced, tb.sliced);
            assert_eq!(ta.sliced2d, tb.sliced2d);
        }
    }
}
