//! # es-lattice
//!
//! Bidirectional mapping between multi-dimensional lattice points and single
//! linear (combinatorial) indices, plus an odometer-style increment that
//! enumerates every lattice point exactly once in a fixed deterministic order.
//!
//! Convention: dimension 0 is the fastest-varying digit (first-axis-fastest,
//! i.e. column-major). Every consumer that reshapes a linear histogram into a
//! multi-dimensional array must use the same convention, otherwise
//! distributions come out silently transposed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod enumerate;

pub use codec::{decode, increment, linearize, n_cells};
pub use enumerate::{cells, CellIter};
