//! Sampling plans: per-cell run counts from a target initial density.

use serde::{Deserialize, Serialize};

use es_core::{Error, InitialDensity, Result};
use es_lattice::cells;

/// Bounded lattice of initial states: per-dimension sizes and lower limits.
///
/// The sample space should cover most of the initial distribution's mass;
/// cells outside it are never simulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSpace {
    interval: Vec<usize>,
    liml: Vec<i64>,
}

impl SampleSpace {
    /// Build a sample space. Sizes and lower limits must have equal length
    /// and every size must be >= 1.
    pub fn new(interval: Vec<usize>, liml: Vec<i64>) -> Result<Self> {
        if interval.len() != liml.len() {
            return Err(Error::Domain(format!(
                "sample space has {} sizes but {} lower limits",
                interval.len(),
                liml.len()
            )));
        }
        if interval.is_empty() {
            return Err(Error::Domain("sample space must cover at least one dimension".into()));
        }
        for (k, &size) in interval.iter().enumerate() {
            if size == 0 {
                return Err(Error::Domain(format!(
                    "sample-space dimension {k} has size 0, must be >= 1"
                )));
            }
        }
        Ok(Self { interval, liml })
    }

    /// Per-dimension sizes.
    pub fn interval(&self) -> &[usize] {
        &self.interval
    }

    /// Per-dimension lower limits.
    pub fn liml(&self) -> &[i64] {
        &self.liml
    }

    /// Number of dimensions (species).
    pub fn dims(&self) -> usize {
        self.interval.len()
    }

    /// Total number of lattice cells.
    pub fn n_cells(&self) -> Result<usize> {
        es_lattice::n_cells(&self.interval)
    }

    /// Absolute initial state of a codec-relative cell.
    pub fn state_of(&self, cell: &[usize]) -> Vec<i64> {
        cell.iter().zip(&self.liml).map(|(&digit, &lo)| digit as i64 + lo).collect()
    }
}

/// Per-cell run allocation for one sampling pass.
///
/// Built once, immutable afterwards, consumed exactly once by
/// [`crate::run`] / [`crate::run_serial`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingPlan {
    space: SampleSpace,
    run_counts: Vec<u64>,
    total_runs: u64,
    rounding_error: f64,
}

impl SamplingPlan {
    /// Evaluate `density` over every cell of `space` (in enumeration order,
    /// exactly once) and round the per-cell budgets.
    ///
    /// `run_counts[i] = round(p_i * sweeps)`: cells whose probability mass
    /// rounds to zero receive zero runs and are skipped downstream. This is a
    /// deliberate lossy discretization of the continuous budget; the returned
    /// `rounding_error` (Euclidean norm between `run_counts / total_runs` and
    /// the target masses) lets the caller judge whether `sweeps` was large
    /// enough to resolve the distribution's shape.
    pub fn build(
        space: SampleSpace,
        density: &impl InitialDensity,
        sweeps: u64,
    ) -> Result<Self> {
        let dx = space.n_cells()?;
        let mut p_lin = Vec::with_capacity(dx);
        let mut run_counts = Vec::with_capacity(dx);
        let mut total_runs = 0u64;

        for cell in cells(space.interval())? {
            let state = space.state_of(&cell);
            let p = density.p0(&state);
            if !p.is_finite() || p < 0.0 {
                return Err(Error::Domain(format!(
                    "initial density returned {p} at state {state:?}, must be a finite value >= 0"
                )));
            }
            let count = (p * sweeps as f64).round() as u64;
            total_runs += count;
            p_lin.push(p);
            run_counts.push(count);
        }

        if total_runs == 0 {
            return Err(Error::DegenerateSampling(format!(
                "sweep budget {sweeps} rounds to zero runs over {dx} cells; \
                 increase the budget or tighten the sample space"
            )));
        }

        let rounding_error = p_lin
            .iter()
            .zip(&run_counts)
            .map(|(&p, &count)| {
                let fraction = count as f64 / total_runs as f64;
                (fraction - p) * (fraction - p)
            })
            .sum::<f64>()
            .sqrt();

        Ok(Self { space, run_counts, total_runs, rounding_error })
    }

    /// The sample space this plan covers.
    pub fn space(&self) -> &SampleSpace {
        &self.space
    }

    /// Planned run count per lattice cell, in enumeration order.
    pub fn run_counts(&self) -> &[u64] {
        &self.run_counts
    }

    /// Total planned runs. May differ slightly from the sweep budget due to
    /// rounding.
    pub fn total_runs(&self) -> u64 {
        self.total_runs
    }

    /// Euclidean norm between the realized run fractions and the target
    /// masses; near 0 when the budget resolves the distribution well.
    pub fn rounding_error(&self) -> f64 {
        self.rounding_error
    }
}
