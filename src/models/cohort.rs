//! Nesting cohort records
//!
//! A `NestingCohortRecord` is what the external cohort data source yields:
//! one entry per (person, cohort entry). `EligibilityRecord` is the same data
//! once accepted into the eligibility store, with visit dates guaranteed
//! sorted and index dates kept in the order they were supplied.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::types::{ConceptId, Day, PersonId};

/// One nesting-cohort entry for one person, as produced by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestingCohortRecord {
    /// Person identifier
    pub person_id: PersonId,
    /// Gender concept identifier
    pub gender_concept_id: ConceptId,
    /// Date of birth
    pub date_of_birth: Day,
    /// Provider, if known
    pub provider_id: Option<ConceptId>,
    /// Care site, if known
    pub care_site_id: Option<ConceptId>,
    /// Start of the at-risk window for this entry
    pub start_date: Day,
    /// End of the at-risk window for this entry
    pub end_date: Day,
    /// Start of the enclosing observation period
    pub observation_period_start_date: Day,
    /// Dates at which this person had the outcome during this entry
    pub index_dates: Vec<Day>,
    /// Visit dates; only populated when visit matching is requested
    pub visit_dates: Option<Vec<Day>>,
}

impl NestingCohortRecord {
    /// Create a record with no outcomes and no visits
    #[must_use]
    pub fn new(
        person_id: PersonId,
        gender_concept_id: ConceptId,
        date_of_birth: Day,
        start_date: Day,
        end_date: Day,
        observation_period_start_date: Day,
    ) -> Self {
        Self {
            person_id,
            gender_concept_id,
            date_of_birth,
            provider_id: None,
            care_site_id: None,
            start_date,
            end_date,
            observation_period_start_date,
            index_dates: Vec::new(),
            visit_dates: None,
        }
    }

    /// Set the provider
    #[must_use]
    pub fn with_provider(mut self, provider_id: ConceptId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    /// Set the care site
    #[must_use]
    pub fn with_care_site(mut self, care_site_id: ConceptId) -> Self {
        self.care_site_id = Some(care_site_id);
        self
    }

    /// Set the outcome dates
    #[must_use]
    pub fn with_index_dates(mut self, index_dates: impl Into<Vec<Day>>) -> Self {
        self.index_dates = index_dates.into();
        self
    }

    /// Set the visit dates
    #[must_use]
    pub fn with_visit_dates(mut self, visit_dates: impl Into<Vec<Day>>) -> Self {
        self.visit_dates = Some(visit_dates.into());
        self
    }
}

/// Attributes of one cohort entry needed to test eligibility and matching
///
/// Immutable once the store is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityRecord {
    pub person_id: PersonId,
    pub gender_concept_id: ConceptId,
    pub date_of_birth: Day,
    pub provider_id: Option<ConceptId>,
    pub care_site_id: Option<ConceptId>,
    pub start_date: Day,
    pub end_date: Day,
    pub observation_period_start_date: Day,
    /// Own outcome dates, used to exclude this person as a control
    pub index_dates: SmallVec<[Day; 2]>,
    /// Ascending visit dates (empty when visit matching is off)
    pub visit_dates: Vec<Day>,
}

impl EligibilityRecord {
    /// Build from a source record, keeping visit dates only when requested
    #[must_use]
    pub fn from_source(record: NestingCohortRecord, keep_visits: bool) -> Self {
        let mut visit_dates = if keep_visits {
            record.visit_dates.unwrap_or_default()
        } else {
            Vec::new()
        };
        visit_dates.sort_unstable();

        Self {
            person_id: record.person_id,
            gender_concept_id: record.gender_concept_id,
            date_of_birth: record.date_of_birth,
            provider_id: record.provider_id,
            care_site_id: record.care_site_id,
            start_date: record.start_date,
            end_date: record.end_date,
            observation_period_start_date: record.observation_period_start_date,
            index_dates: SmallVec::from_vec(record.index_dates),
            visit_dates,
        }
    }

    /// Whether the person had the outcome on or before `date`
    #[must_use]
    pub fn has_outcome_on_or_before(&self, date: Day) -> bool {
        self.index_dates.iter().any(|&d| d <= date)
    }

    /// Whether the person had the outcome exactly on `date`
    #[must_use]
    pub fn has_outcome_on(&self, date: Day) -> bool {
        self.index_dates.contains(&date)
    }

    /// Smallest visit date on or after `date`, if any
    #[must_use]
    pub fn first_visit_on_or_after(&self, date: Day) -> Option<Day> {
        let idx = self.visit_dates.partition_point(|&v| v < date);
        self.visit_dates.get(idx).copied()
    }
}
