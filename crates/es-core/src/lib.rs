//! # es-core
//!
//! Core types for EnsembleStat:
//! - the shared error taxonomy ([`Error`], [`Result`])
//! - the trajectory-ensemble container ([`Ensemble`])
//! - lattice bounds and observed bounding boxes ([`LatticeBounds`])
//! - collaborator contracts ([`SimulationEngine`], [`InitialDensity`])
//!
//! Downstream crates (`es-lattice`, `es-estimate`, `es-sampler`) depend on
//! these types only; no compute lives here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bounds;
pub mod ensemble;
pub mod error;
pub mod traits;

pub use bounds::LatticeBounds;
pub use ensemble::Ensemble;
pub use error::{Error, Result};
pub use traits::{InitialDensity, SimulationEngine};

/// Crate version (propagated into CLI `--version` output).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
