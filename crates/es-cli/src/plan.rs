//! `plan` subcommand: tabulated initial density -> sampling plan.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use es_core::InitialDensity;
use es_lattice::linearize;
use es_sampler::{SampleSpace, SamplingPlan};

/// Tabulated initial density: probabilities in combinatorial-index order over
/// the lattice `[liml, liml + interval)`.
#[derive(Deserialize)]
struct DensityFile {
    interval: Vec<usize>,
    liml: Vec<i64>,
    probabilities: Vec<f64>,
}

/// Lookup-table density over the tabulated lattice; zero outside it.
struct TabulatedDensity {
    interval: Vec<usize>,
    liml: Vec<i64>,
    probabilities: Vec<f64>,
}

impl InitialDensity for TabulatedDensity {
    fn p0(&self, state: &[i64]) -> f64 {
        let mut digits = Vec::with_capacity(state.len());
        for (k, &x) in state.iter().enumerate() {
            let shifted = x - self.liml[k];
            if shifted < 0 || shifted as usize >= self.interval[k] {
                return 0.0;
            }
            digits.push(shifted as usize);
        }
        match linearize(&digits, &self.interval) {
            Ok(index) => self.probabilities[index],
            Err(_) => 0.0,
        }
    }
}

#[derive(Serialize)]
struct PlanFile<'a> {
    interval: &'a [usize],
    liml: &'a [i64],
    run_counts: &'a [u64],
    total_runs: u64,
    rounding_error: f64,
}

pub fn run(p0: PathBuf, sweeps: u64, output: Option<PathBuf>) -> Result<()> {
    let file = File::open(&p0).with_context(|| format!("opening {}", p0.display()))?;
    let raw: DensityFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", p0.display()))?;

    let space = SampleSpace::new(raw.interval.clone(), raw.liml.clone())?;
    let expected = space.n_cells()?;
    ensure!(
        raw.probabilities.len() == expected,
        "density table holds {} probabilities, lattice {:?} has {expected} cells",
        raw.probabilities.len(),
        raw.interval
    );

    let density = TabulatedDensity {
        interval: raw.interval,
        liml: raw.liml,
        probabilities: raw.probabilities,
    };
    let plan = SamplingPlan::build(space, &density, sweeps)?;
    tracing::info!(
        total_runs = plan.total_runs(),
        rounding_error = plan.rounding_error(),
        "sampling plan built"
    );

    let out = PlanFile {
        interval: plan.space().interval(),
        liml: plan.space().liml(),
        run_counts: plan.run_counts(),
        total_runs: plan.total_runs(),
        rounding_error: plan.rounding_error(),
    };
    match output {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &out)?;
        }
        None => {
            serde_json::to_writer_pretty(io::stdout().lock(), &out)?;
            println!();
        }
    }
    Ok(())
}
