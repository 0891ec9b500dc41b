//! Control selection for a single stratum
//!
//! Selection runs as a two-phase state machine. Phase one probes random
//! indices in the candidate range and keeps every distinct match until the
//! quota is met or the probe budget runs out. Phase two, entered only when
//! the quota is still open, scans the whole range once and draws the
//! remaining controls without replacement from everyone who matched.

use log::debug;
use rand::Rng;
use rand::distr::{Distribution, Uniform};
use rustc_hash::FxHashSet;

use super::predicate::MatchCriteria;
use super::range::{CandidateRange, age_caliper_range};
use crate::config::SamplingConfig;
use crate::error::{Result, SamplingError};
use crate::models::{CaseData, Day, EligibilityRecord, PersonId, ResultRow, ResultSink, StratumId};

/// Phase of control selection for one stratum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Random probing with the number of probes spent so far
    Probing { iterations: usize },
    /// Exhaustive scan of the candidate range
    Exhaustive,
    /// Quota met or candidates exhausted
    Done,
}

/// The case a stratum is built around
#[derive(Debug, Clone, Copy)]
pub struct StratumCase<'a> {
    pub person_id: PersonId,
    pub case: &'a CaseData,
    pub index_date: Day,
    pub stratum_id: StratumId,
}

/// Counters describing how one stratum was filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// Controls emitted for the stratum
    pub controls: usize,
    /// Random probes spent
    pub probes: usize,
    /// Whether the exhaustive fallback ran
    pub used_fallback: bool,
}

/// Selects matched controls from the eligibility store
#[derive(Debug, Clone)]
pub struct ControlSelector<'a> {
    records: &'a [EligibilityRecord],
    criteria: MatchCriteria,
    controls_per_case: usize,
    max_probe_iterations: usize,
    /// Age caliper in days when age matching is on
    age_caliper_days: Option<i32>,
    /// Whole-store range and distribution shared by every stratum when age
    /// matching is off
    shared: Option<(CandidateRange, Uniform<usize>)>,
}

impl<'a> ControlSelector<'a> {
    /// Create a selector over `records`
    ///
    /// Without age matching every stratum draws from the whole store, so an
    /// empty store is an error here.
    pub fn new(records: &'a [EligibilityRecord], config: &SamplingConfig) -> Result<Self> {
        let shared = if config.match_on_age {
            None
        } else {
            let range =
                CandidateRange::full(records.len()).ok_or(SamplingError::EmptyEligibilityStore)?;
            Some((range, range.distribution()?))
        };

        Ok(Self {
            records,
            criteria: MatchCriteria::from_config(config),
            controls_per_case: config.controls_per_case,
            max_probe_iterations: config.max_probe_iterations,
            age_caliper_days: config.match_on_age.then(|| config.age_caliper_days()),
            shared,
        })
    }

    #[must_use]
    pub const fn criteria(&self) -> &MatchCriteria {
        &self.criteria
    }

    /// Candidate range and distribution for a case
    ///
    /// A fresh distribution is built per case when age matching is on.
    fn candidate_range(&self, case: &CaseData) -> Result<Option<(CandidateRange, Uniform<usize>)>> {
        match self.age_caliper_days {
            Some(caliper_days) => {
                match age_caliper_range(self.records, case.date_of_birth, caliper_days) {
                    Some(range) => Ok(Some((range, range.distribution()?))),
                    None => Ok(None),
                }
            }
            None => Ok(self.shared.clone()),
        }
    }

    /// Find up to `controls_per_case` controls for one stratum, emitting a
    /// control row per selected person into `sink`
    pub fn find_controls<R, S>(
        &self,
        stratum: StratumCase<'_>,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<SelectionOutcome>
    where
        R: Rng + ?Sized,
        S: ResultSink + ?Sized,
    {
        let mut outcome = SelectionOutcome::default();

        let Some((range, distribution)) = self.candidate_range(stratum.case)? else {
            debug!(
                "No candidates within age caliper for person {} on {} (stratum {})",
                stratum.person_id, stratum.index_date, stratum.stratum_id
            );
            return Ok(outcome);
        };

        let mut selected = FxHashSet::default();
        let mut phase = SelectionPhase::Probing { iterations: 0 };

        loop {
            phase = match phase {
                SelectionPhase::Probing { .. } if selected.len() >= self.controls_per_case => {
                    SelectionPhase::Done
                }
                SelectionPhase::Probing { iterations } if iterations >= self.max_probe_iterations => {
                    SelectionPhase::Exhaustive
                }
                SelectionPhase::Probing { iterations } => {
                    let idx = distribution.sample(rng);
                    self.probe(idx, &stratum, &mut selected, sink);
                    outcome.probes = iterations + 1;
                    SelectionPhase::Probing {
                        iterations: iterations + 1,
                    }
                }
                SelectionPhase::Exhaustive => {
                    outcome.used_fallback = true;
                    self.exhaustive(range, &stratum, &mut selected, rng, sink);
                    SelectionPhase::Done
                }
                SelectionPhase::Done => break,
            };
        }

        outcome.controls = selected.len();
        Ok(outcome)
    }

    /// Test one randomly drawn candidate and emit it if it is a new match
    fn probe<S: ResultSink + ?Sized>(
        &self,
        idx: usize,
        stratum: &StratumCase<'_>,
        selected: &mut FxHashSet<PersonId>,
        sink: &mut S,
    ) {
        let candidate = &self.records[idx];
        let Some(date) = self
            .criteria
            .is_match(candidate, stratum.case, stratum.index_date)
            .event_date(stratum.index_date)
        else {
            return;
        };

        if candidate.person_id != stratum.person_id && selected.insert(candidate.person_id) {
            sink.add(ResultRow::control(
                candidate.person_id,
                date,
                stratum.stratum_id,
            ));
        }
    }

    /// Scan the full range and draw the remaining controls without replacement
    fn exhaustive<R, S>(
        &self,
        range: CandidateRange,
        stratum: &StratumCase<'_>,
        selected: &mut FxHashSet<PersonId>,
        rng: &mut R,
        sink: &mut S,
    ) where
        R: Rng + ?Sized,
        S: ResultSink + ?Sized,
    {
        debug!(
            "Random probing found {} of {} controls for stratum {}; scanning {} candidates",
            selected.len(),
            self.controls_per_case,
            stratum.stratum_id,
            range.len()
        );

        let mut pooled = FxHashSet::default();
        let mut pool: Vec<(PersonId, Day)> = Vec::new();
        for idx in range.indices() {
            let candidate = &self.records[idx];
            if candidate.person_id == stratum.person_id
                || selected.contains(&candidate.person_id)
                || pooled.contains(&candidate.person_id)
            {
                continue;
            }
            if let Some(date) = self
                .criteria
                .is_match(candidate, stratum.case, stratum.index_date)
                .event_date(stratum.index_date)
            {
                pooled.insert(candidate.person_id);
                pool.push((candidate.person_id, date));
            }
        }

        while selected.len() < self.controls_per_case && !pool.is_empty() {
            let pick = rng.random_range(0..pool.len());
            let (person_id, date) = pool.remove(pick);
            selected.insert(person_id);
            sink.add(ResultRow::control(person_id, date, stratum.stratum_id));
        }
    }
}
