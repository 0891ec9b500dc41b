//! Case index entries
//!
//! A `CaseData` aggregates everything needed to process one person as a case:
//! a demographic snapshot from the person's first accepted cohort entry and
//! the outcome dates collected across all of that person's entries.

use smallvec::SmallVec;

use super::cohort::EligibilityRecord;
use super::types::{ConceptId, Day};

/// One outcome occurrence for a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexDate {
    /// Date of the outcome
    pub date: Day,
    /// True when the person had insufficient run-in on this date
    pub washed_out: bool,
}

impl IndexDate {
    #[must_use]
    pub const fn new(date: Day, washed_out: bool) -> Self {
        Self { date, washed_out }
    }
}

/// Demographic and enrollment snapshot of a case, plus its outcome dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseData {
    pub gender_concept_id: ConceptId,
    pub date_of_birth: Day,
    pub provider_id: Option<ConceptId>,
    pub care_site_id: Option<ConceptId>,
    pub start_date: Day,
    /// Outcome dates; sorted before processing
    pub index_dates: SmallVec<[IndexDate; 4]>,
}

impl CaseData {
    /// Snapshot the demographics of a record, with no outcome dates yet
    #[must_use]
    pub fn snapshot(record: &EligibilityRecord) -> Self {
        Self {
            gender_concept_id: record.gender_concept_id,
            date_of_birth: record.date_of_birth,
            provider_id: record.provider_id,
            care_site_id: record.care_site_id,
            start_date: record.start_date,
            index_dates: SmallVec::new(),
        }
    }

    /// Sort the index dates ascending by date
    pub fn sort_index_dates(&mut self) {
        self.index_dates.sort_unstable();
    }

    /// Index dates that qualify for case processing, in date order
    ///
    /// In first-outcome-only mode at most one date is returned: the earliest
    /// date that is not washed out.
    pub fn qualifying_dates(&self, first_outcome_only: bool) -> impl Iterator<Item = Day> + '_ {
        let limit = if first_outcome_only { 1 } else { usize::MAX };
        self.index_dates
            .iter()
            .filter(|index_date| !index_date.washed_out)
            .map(|index_date| index_date.date)
            .take(limit)
    }
}
