//! Configuration for synthetic nesting cohorts
//!
//! Synthetic cohorts exercise the sampler without access to real data:
//! the binary uses them for demonstration runs and tests use them as
//! realistic, reproducible input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for synthetic cohort generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticCohortConfig {
    /// Number of persons in the cohort
    pub persons: usize,
    /// First day any cohort entry may start
    pub study_start_date: NaiveDate,
    /// Last day any cohort entry may end
    pub study_end_date: NaiveDate,
    /// Earliest birth year
    pub min_birth_year: i32,
    /// Latest birth year
    pub max_birth_year: i32,
    /// Maximum number of cohort entries per person
    pub max_entries_per_person: usize,
    /// Probability that a cohort entry contains at least one outcome
    pub outcome_rate: f64,
    /// Maximum number of outcomes within one entry
    pub max_outcomes_per_entry: usize,
    /// Number of distinct providers
    pub provider_count: i64,
    /// Number of distinct care sites
    pub care_site_count: i64,
    /// Probability that an entry has no provider
    pub missing_provider_rate: f64,
    /// Probability that an entry has no care site
    pub missing_care_site_rate: f64,
    /// Whether to generate visit dates
    pub with_visits: bool,
    /// Average number of visits per year of observation
    pub visits_per_year: f64,
}

impl Default for SyntheticCohortConfig {
    fn default() -> Self {
        Self {
            persons: 1000,
            study_start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            study_end_date: NaiveDate::from_ymd_opt(2019, 12, 31).unwrap_or_default(),
            min_birth_year: 1930,
            max_birth_year: 2000,
            max_entries_per_person: 2,
            outcome_rate: 0.1,
            max_outcomes_per_entry: 2,
            provider_count: 50,
            care_site_count: 10,
            missing_provider_rate: 0.05,
            missing_care_site_rate: 0.05,
            with_visits: true,
            visits_per_year: 4.0,
        }
    }
}

impl fmt::Display for SyntheticCohortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Synthetic Cohort Configuration:")?;
        writeln!(f, "  Persons: {}", self.persons)?;
        writeln!(
            f,
            "  Study period: {} to {}",
            self.study_start_date, self.study_end_date
        )?;
        writeln!(
            f,
            "  Birth years: {} to {}",
            self.min_birth_year, self.max_birth_year
        )?;
        writeln!(f, "  Outcome rate per entry: {}", self.outcome_rate)?;
        writeln!(f, "  Visits: {}", self.with_visits)?;
        Ok(())
    }
}
