//! Collaborator contracts for EnsembleStat
//!
//! The stochastic-simulation engine that actually produces trajectories and
//! the initial-condition density it is driven by are external collaborators;
//! this module pins down their seams so that the sampler does not depend on
//! any concrete engine.

use crate::Result;

/// Contract of the external stochastic-simulation engine.
///
/// One call runs `n_runs` independent trajectories from a single initial
/// state over the given time grid and returns a flat row-major block of shape
/// `[n_runs, time_points.len(), m]` of non-negative population counts.
///
/// Implementations must be safe to invoke from concurrent sampler tasks:
/// per-call configuration only, no mutation of shared model state. Any seeding
/// discipline is the engine's own business; given the same seed an engine is
/// expected to be deterministic.
pub trait SimulationEngine: Send + Sync {
    /// Run `n_runs` trajectories starting from `initial_state`.
    fn simulate(
        &self,
        initial_state: &[i64],
        time_points: &[f64],
        n_runs: usize,
    ) -> Result<Vec<i64>>;

    /// Engine name for diagnostics (e.g. "StochKit", "gillespie-direct").
    fn name(&self) -> &str;
}

/// Initial probability mass function over absolute integer states.
///
/// Pure: called once per lattice cell, in enumeration order, with no side
/// effects expected. Values must lie in `[0, 1]`.
pub trait InitialDensity: Sync {
    /// Evaluate the probability mass at `state`.
    fn p0(&self, state: &[i64]) -> f64;
}

impl<F> InitialDensity for F
where
    F: Fn(&[i64]) -> f64 + Sync,
{
    fn p0(&self, state: &[i64]) -> f64 {
        self(state)
    }
}
