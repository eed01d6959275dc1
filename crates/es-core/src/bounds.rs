//! Lattice bounds: per-dimension sizes and offsets.

use serde::{Deserialize, Serialize};

use crate::{Ensemble, Error, Result};

/// Per-dimension bounds of a population-count lattice.
///
/// `n[k]` is the number of admissible values of species `k`, `n_min[k]` /
/// `n_max[k]` the raw lower/upper population bounds, so that
/// `n[k] == n_max[k] - n_min[k] + 1`. A lattice point in codec-relative
/// coordinates has each digit in `[0, n[k])`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeBounds {
    n: Vec<usize>,
    n_min: Vec<i64>,
    n_max: Vec<i64>,
}

impl LatticeBounds {
    /// Build bounds from sizes and lower offsets.
    ///
    /// The sequences must have equal length and every size must be >= 1.
    pub fn new(n: Vec<usize>, n_min: Vec<i64>) -> Result<Self> {
        if n.len() != n_min.len() {
            return Err(Error::Domain(format!(
                "bounds length mismatch: {} sizes vs {} offsets",
                n.len(),
                n_min.len()
            )));
        }
        if n.is_empty() {
            return Err(Error::Domain("bounds must cover at least one dimension".into()));
        }
        for (k, &size) in n.iter().enumerate() {
            if size == 0 {
                return Err(Error::Domain(format!("dimension {k} has size 0, must be >= 1")));
            }
        }
        let n_max = n.iter().zip(&n_min).map(|(&size, &lo)| lo + size as i64 - 1).collect();
        Ok(Self { n, n_min, n_max })
    }

    /// Observed bounding box of an ensemble: per-species min/max population
    /// across all runs and times.
    ///
    /// This is an observed box, not a modeled bound — a population value never
    /// observed anywhere in the ensemble is invisible to distributions built
    /// over these bounds.
    pub fn observed(ensemble: &Ensemble) -> Self {
        let m = ensemble.n_species();
        let mut n_min = vec![i64::MAX; m];
        let mut n_max = vec![i64::MIN; m];
        for run in 0..ensemble.n_runs() {
            for t in 0..ensemble.n_time() {
                for (k, &x) in ensemble.state(run, t).iter().enumerate() {
                    n_min[k] = n_min[k].min(x);
                    n_max[k] = n_max[k].max(x);
                }
            }
        }
        let n = n_max.iter().zip(&n_min).map(|(&hi, &lo)| (hi - lo + 1) as usize).collect();
        Self { n, n_min, n_max }
    }

    /// Number of dimensions (species).
    pub fn dims(&self) -> usize {
        self.n.len()
    }

    /// Per-dimension sizes.
    pub fn n(&self) -> &[usize] {
        &self.n
    }

    /// Per-dimension raw lower bounds.
    pub fn n_min(&self) -> &[i64] {
        &self.n_min
    }

    /// Per-dimension raw upper bounds.
    pub fn n_max(&self) -> &[i64] {
        &self.n_max
    }

    /// Total number of lattice cells, if it fits in `usize`.
    pub fn n_cells(&self) -> Result<usize> {
        self.n.iter().try_fold(1usize, |acc, &size| acc.checked_mul(size)).ok_or_else(|| {
            Error::Domain(format!("lattice {:?} has more cells than usize can hold", self.n))
        })
    }

    /// Convert a raw (absolute) population vector into codec-relative digits.
    ///
    /// Fails if the vector has the wrong length or any component falls outside
    /// `[n_min[k], n_max[k]]`.
    pub fn relative(&self, state: &[i64]) -> Result<Vec<usize>> {
        if state.len() != self.dims() {
            return Err(Error::Domain(format!(
                "state {:?} has {} components, bounds cover {} dimensions",
                state,
                state.len(),
                self.dims()
            )));
        }
        state
            .iter()
            .enumerate()
            .map(|(k, &x)| {
                if x < self.n_min[k] || x > self.n_max[k] {
                    return Err(Error::Domain(format!(
                        "state component {x} of dimension {k} outside observed range [{}, {}]",
                        self.n_min[k], self.n_max[k]
                    )));
                }
                Ok((x - self.n_min[k]) as usize)
            })
            .collect()
    }
}
