//! Simulation dispatch and ensemble assembly.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use es_core::{Ensemble, Error, Result, SimulationEngine};
use es_lattice::cells;

use crate::plan::SamplingPlan;

/// Output of one adaptive sampling pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledEnsemble {
    /// Assembled trajectories of shape `[total_runs, time_points, species]`.
    pub ensemble: Ensemble,
    /// Actually realized total run count (equals the plan's total).
    pub total_runs: usize,
    /// The plan's rounding-error diagnostic, carried through for reporting.
    pub rounding_error: f64,
}

/// One nonzero-count cell of the plan.
struct CellTask {
    state: Vec<i64>,
    n_runs: usize,
}

/// Collect the nonzero-count cells of `plan` in enumeration order.
fn cell_tasks(plan: &SamplingPlan) -> Result<Vec<CellTask>> {
    let mut tasks = Vec::new();
    for (cell, &count) in cells(plan.space().interval())?.zip(plan.run_counts()) {
        if count > 0 {
            tasks.push(CellTask { state: plan.space().state_of(&cell), n_runs: count as usize });
        }
    }
    Ok(tasks)
}

/// Invoke the engine for one cell and validate the returned block shape.
fn simulate_cell(
    engine: &dyn SimulationEngine,
    task: &CellTask,
    time_points: &[f64],
    block: &mut [i64],
) -> Result<()> {
    let out = engine.simulate(&task.state, time_points, task.n_runs).map_err(|e| {
        Error::Engine(format!("initial state {:?} ({} runs): {e}", task.state, task.n_runs))
    })?;
    if out.len() != block.len() {
        return Err(Error::Engine(format!(
            "engine '{}' returned {} values for initial state {:?}, expected {}",
            engine.name(),
            out.len(),
            task.state,
            block.len()
        )));
    }
    block.copy_from_slice(&out);
    Ok(())
}

/// Run the sampling pass: one engine invocation per nonzero-count cell, in
/// parallel on the rayon pool.
///
/// Row offsets are a prefix sum over the plan's run counts, computed before
/// dispatch; each task fills a self-contained `[run_count, time, species]`
/// block in its own disjoint slice of the output, so concurrent writes never
/// race. Zero-count cells are skipped without touching the engine.
///
/// Failure policy: abort-all. The first failing cell fails the whole pass
/// with the cell's initial state in the error; a partially filled ensemble is
/// never returned.
pub fn run(
    plan: SamplingPlan,
    engine: &dyn SimulationEngine,
    time_points: &[f64],
) -> Result<SampledEnsemble> {
    let (tasks, mut data, block_len) = prepare(&plan, time_points)?;

    // Carve the output into per-task disjoint blocks (the prefix sum is
    // implicit in the running split: tasks are in enumeration order).
    let mut blocks: Vec<&mut [i64]> = Vec::with_capacity(tasks.len());
    let mut rest = data.as_mut_slice();
    for task in &tasks {
        let (block, tail) = rest.split_at_mut(task.n_runs * block_len);
        blocks.push(block);
        rest = tail;
    }

    tasks
        .par_iter()
        .zip(blocks.into_par_iter())
        .try_for_each(|(task, block)| simulate_cell(engine, task, time_points, block))?;

    finish(plan, data, time_points)
}

/// Sequential reference implementation of [`run`], identical semantics.
///
/// Dispatch order is the enumeration order, so for a deterministic engine the
/// assembled ensemble is bit-identical to the parallel path.
pub fn run_serial(
    plan: SamplingPlan,
    engine: &dyn SimulationEngine,
    time_points: &[f64],
) -> Result<SampledEnsemble> {
    let (tasks, mut data, block_len) = prepare(&plan, time_points)?;

    let mut offset = 0usize;
    for task in &tasks {
        let rows = task.n_runs * block_len;
        simulate_cell(engine, task, time_points, &mut data[offset..offset + rows])?;
        offset += rows;
    }

    finish(plan, data, time_points)
}

/// Validate inputs, collect tasks and preallocate the output arena.
fn prepare(
    plan: &SamplingPlan,
    time_points: &[f64],
) -> Result<(Vec<CellTask>, Vec<i64>, usize)> {
    if time_points.is_empty() {
        return Err(Error::Domain("time grid must contain at least one point".into()));
    }
    let m = plan.space().dims();
    let total_runs = plan.total_runs() as usize;
    let block_len = time_points.len() * m;
    let tasks = cell_tasks(plan)?;
    let data = vec![0i64; total_runs * block_len];
    Ok((tasks, data, block_len))
}

fn finish(plan: SamplingPlan, data: Vec<i64>, time_points: &[f64]) -> Result<SampledEnsemble> {
    let total_runs = plan.total_runs() as usize;
    let ensemble =
        Ensemble::from_raw(data, total_runs, time_points.len(), plan.space().dims())?;
    Ok(SampledEnsemble { ensemble, total_runs, rounding_error: plan.rounding_error() })
}
