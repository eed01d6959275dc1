//! `estimate` subcommand: saved ensemble -> distribution bundle.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use es_core::Ensemble;
use es_estimate::{DistributionBundle, EnsembleDistributions};

/// On-disk ensemble layout; validated through `Ensemble::from_raw` so a
/// hand-edited file cannot smuggle in an inconsistent shape.
#[derive(Deserialize)]
struct EnsembleFile {
    n_runs: usize,
    n_time: usize,
    n_species: usize,
    data: Vec<i64>,
}

pub fn run(
    input: PathBuf,
    slice: Option<Vec<i64>>,
    full_joint: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let raw: EnsembleFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", input.display()))?;
    let ensemble = Ensemble::from_raw(raw.data, raw.n_runs, raw.n_time, raw.n_species)?;

    let est = EnsembleDistributions::new(ensemble);
    tracing::info!(
        n = ?est.bounds().n(),
        n_min = ?est.bounds().n_min(),
        "observed lattice bounds"
    );

    let slice_rel = match slice {
        Some(raw_state) => est.bounds().relative(&raw_state)?,
        None => vec![0; est.bounds().dims()],
    };

    let set = est.estimate(&slice_rel)?;
    let mut bundle = DistributionBundle::from_set(&set);
    if full_joint {
        bundle = bundle.with_full_joint(est.full_joint()?);
    }

    match output {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            bundle.write_json(BufWriter::new(file))?;
        }
        None => {
            bundle.write_json(io::stdout().lock())?;
            println!();
        }
    }
    Ok(())
}
