//! Error types for EnsembleStat

use thiserror::Error;

/// EnsembleStat error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed lattice bounds, out-of-range index or negative probability.
    /// The message names the offending dimension/state and the violated bound.
    #[error("domain error: {0}")]
    Domain(String),

    /// A zero-mass histogram would have been normalized into a distribution.
    #[error("degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// The rounded run budget collapsed to zero total runs.
    #[error("degenerate sampling: {0}")]
    DegenerateSampling(String),

    /// Opaque failure surfaced from the external simulation collaborator.
    /// Not recovered locally; carries the failing cell's initial state.
    #[error("simulation engine error: {0}")]
    Engine(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
