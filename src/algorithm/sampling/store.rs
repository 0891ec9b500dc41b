//! Eligibility record store and case index construction
//!
//! Both structures are built in a single pass over the cohort data source
//! and are read-only afterwards. When age matching is enabled the store is
//! sorted by date of birth so caliper windows can be found by binary search.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use log::{debug, info};

use crate::config::SamplingConfig;
use crate::models::{CaseData, EligibilityRecord, IndexDate, PersonId};
use crate::source::CohortDataSource;

/// Case index: one entry per person, iterated in ascending person id order
pub type CaseIndex = BTreeMap<PersonId, CaseData>;

/// Counters collected while building the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreBuildStats {
    /// Records read from the source
    pub records_read: usize,
    /// Records accepted into the store
    pub records_kept: usize,
    /// Records dropped because provider matching needs a provider
    pub excluded_missing_provider: usize,
    /// Records dropped because care site matching needs a care site
    pub excluded_missing_care_site: usize,
    /// Index dates accepted into the case index
    pub index_dates: usize,
    /// Accepted index dates that are washed out
    pub washed_out_dates: usize,
    /// Kept records carrying at least one visit date
    pub records_with_visits: usize,
}

impl fmt::Display for StoreBuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Eligibility Store:")?;
        writeln!(
            f,
            "  Records kept: {} of {}",
            self.records_kept, self.records_read
        )?;
        writeln!(
            f,
            "  Excluded (missing provider / care site): {} / {}",
            self.excluded_missing_provider, self.excluded_missing_care_site
        )?;
        writeln!(
            f,
            "  Index dates: {} ({} washed out)",
            self.index_dates, self.washed_out_dates
        )?;
        write!(f, "  Records with visits: {}", self.records_with_visits)
    }
}

/// All accepted cohort entries, optionally sorted by date of birth
#[derive(Debug, Clone, Default)]
pub struct EligibilityStore {
    records: Vec<EligibilityRecord>,
    sorted_by_birth: bool,
}

impl EligibilityStore {
    /// Wrap records without sorting
    #[must_use]
    pub fn new(records: Vec<EligibilityRecord>) -> Self {
        Self {
            records,
            sorted_by_birth: false,
        }
    }

    /// Stable sort by date of birth; ties keep source order
    pub fn sort_by_birth(&mut self) {
        self.records.sort_by_key(|record| record.date_of_birth);
        self.sorted_by_birth = true;
    }

    #[must_use]
    pub fn records(&self) -> &[EligibilityRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_sorted_by_birth(&self) -> bool {
        self.sorted_by_birth
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record carries a visit date
    #[must_use]
    pub fn has_visit_dates(&self) -> bool {
        self.records.iter().any(|record| !record.visit_dates.is_empty())
    }
}

/// Build the eligibility store and case index from a cohort data source
///
/// Records lacking a provider or care site that the configuration matches on
/// are dropped from both structures. A person's case snapshot is taken from
/// the first record kept for that person; index dates are pooled across all
/// of the person's records.
pub fn build_store<S: CohortDataSource>(
    source: S,
    config: &SamplingConfig,
) -> (EligibilityStore, CaseIndex, StoreBuildStats) {
    if config.match_on_visit_date {
        info!("Loading visit data into memory");
    }

    let mut stats = StoreBuildStats::default();
    let mut records = Vec::new();
    let mut case_index = CaseIndex::new();

    for source_record in source.into_records() {
        stats.records_read += 1;

        if config.match_on_provider && source_record.provider_id.is_none() {
            stats.excluded_missing_provider += 1;
            continue;
        }
        if config.match_on_care_site && source_record.care_site_id.is_none() {
            stats.excluded_missing_care_site += 1;
            continue;
        }

        let record = EligibilityRecord::from_source(source_record, config.match_on_visit_date);
        if !record.visit_dates.is_empty() {
            stats.records_with_visits += 1;
        }

        let case = match case_index.entry(record.person_id) {
            Entry::Vacant(entry) => entry.insert(CaseData::snapshot(&record)),
            Entry::Occupied(entry) => entry.into_mut(),
        };

        let last_eligible = record
            .date_of_birth
            .saturating_add(config.max_age_days)
            .min(record.end_date);
        let run_in_end = record
            .observation_period_start_date
            .saturating_add(config.washout_period)
            .max(record.date_of_birth.saturating_add(config.min_age_days))
            .max(record.start_date);

        for &date in record.index_dates.iter().filter(|&&date| date <= last_eligible) {
            let washed_out = date < run_in_end;
            if washed_out {
                stats.washed_out_dates += 1;
            }
            stats.index_dates += 1;
            case.index_dates.push(IndexDate::new(date, washed_out));
        }

        records.push(record);
    }

    for case in case_index.values_mut() {
        case.sort_index_dates();
    }

    stats.records_kept = records.len();
    let mut store = EligibilityStore::new(records);
    if config.match_on_age {
        store.sort_by_birth();
    }

    debug!("Store build stats: {stats:?}");
    info!(
        "Loaded {} of {} nesting cohort entries for {} persons ({} index dates, {} washed out)",
        stats.records_kept,
        stats.records_read,
        case_index.len(),
        stats.index_dates,
        stats.washed_out_dates
    );

    (store, case_index, stats)
}
