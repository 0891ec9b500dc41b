//! Match predicate: can a candidate serve as a control for a case on a date?
//!
//! Checks run in a fixed order and stop at the first failure: temporal
//! eligibility, gender, provider, care site, time-in-cohort caliper, outcome
//! exclusion, then the visit-date caliper.

use crate::config::SamplingConfig;
use crate::models::{CaseData, Day, EligibilityRecord};

/// Outcome of testing a candidate against a case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// The candidate cannot be a control
    NoMatch,
    /// The candidate matches; carries the visit date when visit matching is on
    Matched { visit_date: Option<Day> },
}

impl MatchResult {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Date to report for the control row, if matched
    #[must_use]
    pub const fn event_date(&self, index_date: Day) -> Option<Day> {
        match self {
            Self::NoMatch => None,
            Self::Matched {
                visit_date: Some(visit_date),
            } => Some(*visit_date),
            Self::Matched { visit_date: None } => Some(index_date),
        }
    }
}

/// Matching switches and calipers, copied out of the sampling configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCriteria {
    pub washout_period: i32,
    pub first_outcome_only: bool,
    pub match_on_gender: bool,
    pub match_on_provider: bool,
    pub match_on_care_site: bool,
    pub match_on_time_in_cohort: bool,
    pub days_in_cohort_caliper: i32,
    pub match_on_visit_date: bool,
    pub visit_date_caliper: i32,
}

impl MatchCriteria {
    #[must_use]
    pub fn from_config(config: &SamplingConfig) -> Self {
        Self {
            washout_period: config.washout_period,
            first_outcome_only: config.first_outcome_only,
            match_on_gender: config.match_on_gender,
            match_on_provider: config.match_on_provider,
            match_on_care_site: config.match_on_care_site,
            match_on_time_in_cohort: config.match_on_time_in_cohort,
            days_in_cohort_caliper: config.days_in_cohort_caliper,
            match_on_visit_date: config.match_on_visit_date,
            visit_date_caliper: config.visit_date_caliper,
        }
    }

    /// Test whether `candidate` matches `case` on `index_date`
    ///
    /// Does not look at person identity or age; the caller excludes the case
    /// itself and restricts candidates to the age caliper window.
    #[must_use]
    pub fn is_match(
        &self,
        candidate: &EligibilityRecord,
        case: &CaseData,
        index_date: Day,
    ) -> MatchResult {
        if index_date < candidate.start_date
            || index_date > candidate.end_date
            || index_date
                < candidate
                    .observation_period_start_date
                    .saturating_add(self.washout_period)
        {
            return MatchResult::NoMatch;
        }

        if self.match_on_gender && case.gender_concept_id != candidate.gender_concept_id {
            return MatchResult::NoMatch;
        }
        if self.match_on_provider && case.provider_id != candidate.provider_id {
            return MatchResult::NoMatch;
        }
        if self.match_on_care_site && case.care_site_id != candidate.care_site_id {
            return MatchResult::NoMatch;
        }
        if self.match_on_time_in_cohort
            && (i64::from(candidate.start_date) - i64::from(case.start_date)).abs()
                > i64::from(self.days_in_cohort_caliper)
        {
            return MatchResult::NoMatch;
        }

        let had_outcome = if self.first_outcome_only {
            candidate.has_outcome_on_or_before(index_date)
        } else {
            candidate.has_outcome_on(index_date)
        };
        if had_outcome {
            return MatchResult::NoMatch;
        }

        if !self.match_on_visit_date {
            return MatchResult::Matched { visit_date: None };
        }

        match candidate.first_visit_on_or_after(index_date) {
            Some(visit_date)
                if i64::from(visit_date) - i64::from(index_date)
                    <= i64::from(self.visit_date_caliper) =>
            {
                MatchResult::Matched {
                    visit_date: Some(visit_date),
                }
            }
            _ => MatchResult::NoMatch,
        }
    }
}
