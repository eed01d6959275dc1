//! Trajectory-ensemble container.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A trajectory ensemble: raw (unshifted) integer population counts of shape
/// `[runs, time_points, species]`, stored flat in row-major order.
///
/// Owned exclusively by the estimator/sampler that produced it and read-only
/// once constructed; all accessors borrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ensemble {
    data: Vec<i64>,
    n_runs: usize,
    n_time: usize,
    n_species: usize,
}

impl Ensemble {
    /// Build an ensemble from a flat row-major buffer.
    ///
    /// Every shape dimension must be at least 1 and `data.len()` must equal
    /// `n_runs * n_time * n_species`.
    pub fn from_raw(data: Vec<i64>, n_runs: usize, n_time: usize, n_species: usize) -> Result<Self> {
        if n_runs == 0 || n_time == 0 || n_species == 0 {
            return Err(Error::Domain(format!(
                "ensemble shape [{n_runs}, {n_time}, {n_species}] has an empty dimension"
            )));
        }
        let expected = n_runs
            .checked_mul(n_time)
            .and_then(|x| x.checked_mul(n_species))
            .ok_or_else(|| {
                Error::Domain(format!(
                    "ensemble shape [{n_runs}, {n_time}, {n_species}] overflows usize"
                ))
            })?;
        if data.len() != expected {
            return Err(Error::Domain(format!(
                "ensemble buffer holds {} values, shape [{n_runs}, {n_time}, {n_species}] requires {expected}",
                data.len()
            )));
        }
        Ok(Self { data, n_runs, n_time, n_species })
    }

    /// Number of independent runs.
    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// Number of sampling times per run.
    pub fn n_time(&self) -> usize {
        self.n_time
    }

    /// Number of species (lattice dimensions).
    pub fn n_species(&self) -> usize {
        self.n_species
    }

    /// Population count of species `species` in run `run` at time index `time`.
    #[inline]
    pub fn value(&self, run: usize, time: usize, species: usize) -> i64 {
        debug_assert!(run < self.n_runs && time < self.n_time && species < self.n_species);
        self.data[(run * self.n_time + time) * self.n_species + species]
    }

    /// Full state vector (all species) of run `run` at time index `time`.
    #[inline]
    pub fn state(&self, run: usize, time: usize) -> &[i64] {
        debug_assert!(run < self.n_runs && time < self.n_time);
        let start = (run * self.n_time + time) * self.n_species;
        &self.data[start..start + self.n_species]
    }

    /// Borrow the flat row-major buffer.
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }
}
