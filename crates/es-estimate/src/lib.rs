//! # es-estimate
//!
//! Turns a raw trajectory ensemble into probability distributions: per-species
//! marginals, a 2D joint marginal over the first species pair, per-species
//! sliced distributions around a fixed reference state, a 2D sliced joint, and
//! (guarded) the full joint distribution over the entire lattice.
//!
//! All outputs are deterministic functions of the ensemble contents, the
//! reference state and the observed bounds: integer counting followed by a
//! single division, no ordering-sensitive float accumulation.

#![warn(clippy::all)]

pub mod bundle;
pub mod estimator;

pub use bundle::DistributionBundle;
pub use estimator::{
    DistributionSet, EnsembleDistributions, Joint2d, TimeDistributions, DEFAULT_MAX_FULL_JOINT_BINS,
};
