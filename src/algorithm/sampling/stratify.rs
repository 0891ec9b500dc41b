//! Stratification loop
//!
//! Walks the case index in ascending person id order. Every qualifying index
//! date of a case opens a new stratum: the case row is emitted and the control
//! selector fills the stratum with controls.

use indicatif::ProgressBar;
use log::info;
use rand::Rng;

use super::selector::{ControlSelector, StratumCase};
use super::store::CaseIndex;
use crate::error::Result;
use crate::models::{CaseData, Day, PersonId, ResultRow, ResultSink, StratumId};

/// Progress is refreshed every this many persons
pub const PROGRESS_INTERVAL: usize = 100;

/// Hands out strictly increasing, 1-based stratum ids
#[derive(Debug, Clone, Default)]
pub struct StratumCounter {
    last: StratumId,
}

impl StratumCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next stratum id
    pub fn next_id(&mut self) -> StratumId {
        self.last += 1;
        self.last
    }

    /// Number of ids handed out so far
    #[must_use]
    pub const fn allocated(&self) -> StratumId {
        self.last
    }
}

/// A stratum identified before any controls are drawn
#[derive(Debug, Clone, Copy)]
pub struct PlannedStratum<'a> {
    pub stratum_id: StratumId,
    pub person_id: PersonId,
    pub case: &'a CaseData,
    pub index_date: Day,
}

impl<'a> PlannedStratum<'a> {
    #[must_use]
    pub const fn as_case(&self) -> StratumCase<'a> {
        StratumCase {
            person_id: self.person_id,
            case: self.case,
            index_date: self.index_date,
            stratum_id: self.stratum_id,
        }
    }

    #[must_use]
    pub const fn case_row(&self) -> ResultRow {
        ResultRow::case(self.person_id, self.index_date, self.stratum_id)
    }
}

/// Enumerate every stratum in processing order, allocating stratum ids
///
/// Yields exactly the strata the sequential loop would open, with the same ids.
pub fn plan_strata(case_index: &CaseIndex, first_outcome_only: bool) -> Vec<PlannedStratum<'_>> {
    let mut counter = StratumCounter::new();
    case_index
        .iter()
        .flat_map(|(&person_id, case)| {
            case.qualifying_dates(first_outcome_only)
                .map(move |index_date| (person_id, case, index_date))
        })
        .map(|(person_id, case, index_date)| PlannedStratum {
            stratum_id: counter.next_id(),
            person_id,
            case,
            index_date,
        })
        .collect()
}

/// Run the stratification loop on one thread with one random stream
///
/// Rows are appended to `sink` in emission order. Returns the number of strata
/// opened.
pub fn stratify_sequential<R, S>(
    case_index: &CaseIndex,
    selector: &ControlSelector<'_>,
    first_outcome_only: bool,
    rng: &mut R,
    sink: &mut S,
    progress: &ProgressBar,
) -> Result<StratumId>
where
    R: Rng + ?Sized,
    S: ResultSink + ?Sized,
{
    let mut counter = StratumCounter::new();
    let mut fallbacks = 0usize;

    for (processed, (&person_id, case)) in case_index.iter().enumerate() {
        for index_date in case.qualifying_dates(first_outcome_only) {
            let stratum_id = counter.next_id();
            sink.add(ResultRow::case(person_id, index_date, stratum_id));

            let outcome = selector.find_controls(
                StratumCase {
                    person_id,
                    case,
                    index_date,
                    stratum_id,
                },
                rng,
                sink,
            )?;
            if outcome.used_fallback {
                fallbacks += 1;
            }
        }

        if processed % PROGRESS_INTERVAL == 0 {
            progress.set_position(processed as u64 + 1);
        }
    }

    progress.set_position(case_index.len() as u64);
    info!(
        "Opened {} strata for {} persons; {} needed the exhaustive fallback",
        counter.allocated(),
        case_index.len(),
        fallbacks
    );

    Ok(counter.allocated())
}
