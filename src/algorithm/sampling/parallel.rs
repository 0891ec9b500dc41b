//! Parallel stratification
//!
//! Strata are planned up front so stratum ids match the sequential loop.
//! Each stratum then draws its controls on a rayon worker from its own random
//! stream, seeded from the run seed and the stratum id, into a local buffer.
//! Buffers are concatenated in stratum order, so the output depends only on
//! the seed and the input, never on the number of threads.

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use super::selector::ControlSelector;
use super::store::CaseIndex;
use super::stratify::plan_strata;
use crate::error::Result;
use crate::models::{ResultRow, ResultSink, StratumId};

/// Seed of the random stream used for one stratum
#[must_use]
pub const fn stratum_seed(base_seed: u64, stratum_id: StratumId) -> u64 {
    base_seed.wrapping_add(stratum_id)
}

/// Run the stratification loop on the rayon thread pool
///
/// Returns the number of strata opened.
pub fn stratify_parallel<S>(
    case_index: &CaseIndex,
    selector: &ControlSelector<'_>,
    first_outcome_only: bool,
    base_seed: u64,
    sink: &mut S,
    progress: &ProgressBar,
) -> Result<StratumId>
where
    S: ResultSink + ?Sized,
{
    let strata = plan_strata(case_index, first_outcome_only);
    info!(
        "Using parallel processing with {} threads for {} strata",
        rayon::current_num_threads(),
        strata.len()
    );

    progress.set_length(strata.len() as u64);

    let buffers: Vec<Vec<ResultRow>> = strata
        .par_iter()
        .progress_with(progress.clone())
        .map(|stratum| -> Result<Vec<ResultRow>> {
            let mut rng = StdRng::seed_from_u64(stratum_seed(base_seed, stratum.stratum_id));
            let mut rows = vec![stratum.case_row()];
            selector.find_controls(stratum.as_case(), &mut rng, &mut rows)?;
            Ok(rows)
        })
        .collect::<Result<_>>()?;

    for row in buffers.into_iter().flatten() {
        sink.add(row);
    }

    Ok(strata.len() as StratumId)
}
