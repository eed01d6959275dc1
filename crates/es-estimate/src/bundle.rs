//! Persisted distribution bundle.
//!
//! Distributions are written as an ordered bundle of named arrays; consumers
//! must read them back in the same order and shapes. The field order below is
//! the wire order: per-species marginals, sliced distributions, 2D marginal
//! matrices, bounds (`n`, `n_min`, `n_max`), then the 2D sliced joints and the
//! optional full joint.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use es_core::Result;

use crate::estimator::{DistributionSet, Joint2d};

/// Ordered, serializable bundle of every distribution of an estimation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionBundle {
    /// Per-time, per-species marginal histograms (each sums to 1).
    pub marginals: Vec<Vec<Vec<f64>>>,
    /// Per-time, per-species sliced distributions (count / run-count scaling).
    pub sliced: Vec<Vec<Vec<f64>>>,
    /// Per-time 2D joint marginal over species {0, 1}; `None` for 1-D systems.
    pub marginal2d: Vec<Option<Joint2d>>,
    /// Per-dimension lattice sizes.
    pub n: Vec<usize>,
    /// Per-dimension raw lower bounds.
    pub n_min: Vec<i64>,
    /// Per-dimension raw upper bounds.
    pub n_max: Vec<i64>,
    /// Per-time 2D sliced joint over species {0, 1}; `None` for 1-D systems.
    pub sliced2d: Vec<Option<Joint2d>>,
    /// Per-time full joint distribution, present only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<Vec<Vec<f64>>>,
}

impl DistributionBundle {
    /// Assemble the bundle from an estimated distribution set.
    pub fn from_set(set: &DistributionSet) -> Self {
        Self {
            marginals: set.times.iter().map(|t| t.marginals.clone()).collect(),
            sliced: set.times.iter().map(|t| t.sliced.clone()).collect(),
            marginal2d: set.times.iter().map(|t| t.marginal2d.clone()).collect(),
            n: set.bounds.n().to_vec(),
            n_min: set.bounds.n_min().to_vec(),
            n_max: set.bounds.n_max().to_vec(),
            sliced2d: set.times.iter().map(|t| t.sliced2d.clone()).collect(),
            full: None,
        }
    }

    /// Attach a full joint distribution to the bundle.
    pub fn with_full_joint(mut self, full: Vec<Vec<f64>>) -> Self {
        self.full = Some(full);
        self
    }

    /// Write the bundle as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a bundle back from JSON.
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
