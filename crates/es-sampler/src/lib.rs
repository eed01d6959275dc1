//! # es-sampler
//!
//! Adaptive initial-condition sampling: allocate a sweep budget across a
//! bounded lattice of initial states proportionally to a target initial
//! probability mass function, dispatch the external simulation engine once
//! per nonzero-count cell, and assemble the results into a single trajectory
//! ensemble.
//!
//! ## Architecture
//!
//! - [`SamplingPlan`] evaluates the density over every lattice cell exactly
//!   once, rounds the per-cell budgets and reports a rounding-error
//!   diagnostic. Immutable once built, consumed exactly once.
//! - [`run`] dispatches one task per nonzero-count cell on a rayon worker
//!   pool; row offsets come from a prefix sum computed before dispatch, so
//!   every task writes a disjoint block and writes never race. [`run_serial`]
//!   is the sequential reference with identical semantics.
//! - Engine failure aborts the whole pass (no partially filled ensemble is
//!   ever returned).

#![warn(clippy::all)]

pub mod dispatch;
pub mod plan;

pub use dispatch::{run, run_serial, SampledEnsemble};
pub use plan::{SampleSpace, SamplingPlan};
