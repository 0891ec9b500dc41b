//! Configuration for nested case-control sampling.
//!
//! `SamplingConfig` carries every matching switch and caliper, plus the
//! run-level knobs (seed, probe budget, parallelism, progress output).
//! It can be built in code with [`SamplingConfigBuilder`] or loaded from a
//! JSON file where missing fields fall back to their defaults.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplingError};

/// Days per year used to turn the age caliper into a day window
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Default number of random probes before falling back to an exhaustive scan
pub const DEFAULT_MAX_PROBE_ITERATIONS: usize = 1000;

/// Configuration for control selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Only the first qualifying outcome per person becomes a case, and
    /// controls must not have had the outcome on or before the index date
    pub first_outcome_only: bool,
    /// Minimum observation time (days) before an index date is usable
    pub washout_period: i32,
    /// Maximum number of controls selected per case
    pub controls_per_case: usize,
    /// Match on date of birth within `age_caliper`
    pub match_on_age: bool,
    /// Maximum age difference in years (fractional)
    pub age_caliper: f64,
    /// Match on gender concept
    pub match_on_gender: bool,
    /// Match on provider
    pub match_on_provider: bool,
    /// Match on care site
    pub match_on_care_site: bool,
    /// Require a control visit within `visit_date_caliper` of the index date
    pub match_on_visit_date: bool,
    /// Maximum distance in days between index date and control visit
    pub visit_date_caliper: i32,
    /// Match on cohort start date within `days_in_cohort_caliper`
    pub match_on_time_in_cohort: bool,
    /// Maximum difference in days between cohort start dates
    pub days_in_cohort_caliper: i32,
    /// Minimum age in days at an index date for it to count
    pub min_age_days: i32,
    /// Maximum age in days at an index date for it to count
    pub max_age_days: i32,
    /// Random probes per stratum before the exhaustive fallback
    pub max_probe_iterations: usize,
    /// Optional random seed for reproducible sampling
    pub random_seed: Option<u64>,
    /// Whether to process strata on the rayon thread pool
    pub use_parallel: bool,
    /// Whether to draw a progress bar while selecting controls
    pub show_progress: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            first_outcome_only: false,
            washout_period: 180,
            controls_per_case: 2,
            match_on_age: true,
            age_caliper: 2.0,
            match_on_gender: true,
            match_on_provider: false,
            match_on_care_site: false,
            match_on_visit_date: false,
            visit_date_caliper: 30,
            match_on_time_in_cohort: false,
            days_in_cohort_caliper: 30,
            min_age_days: 0,
            max_age_days: 36500,
            max_probe_iterations: DEFAULT_MAX_PROBE_ITERATIONS,
            random_seed: None,
            use_parallel: false,
            show_progress: false,
        }
    }
}

impl SamplingConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing a sampling configuration
    #[must_use]
    pub fn builder() -> SamplingConfigBuilder {
        SamplingConfigBuilder::new()
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Age caliper expressed in whole days
    #[must_use]
    pub fn age_caliper_days(&self) -> i32 {
        (self.age_caliper * DAYS_PER_YEAR).floor() as i32
    }

    /// Check the configuration for values that make sampling meaningless
    pub fn validate(&self) -> Result<()> {
        if self.controls_per_case == 0 {
            return Err(SamplingError::invalid_config(
                "controls_per_case must be at least 1",
            ));
        }
        if self.max_probe_iterations == 0 {
            return Err(SamplingError::invalid_config(
                "max_probe_iterations must be at least 1",
            ));
        }
        if self.washout_period < 0 {
            return Err(SamplingError::invalid_config(format!(
                "washout_period must not be negative, got {}",
                self.washout_period
            )));
        }
        if self.match_on_age && (!self.age_caliper.is_finite() || self.age_caliper < 0.0) {
            return Err(SamplingError::invalid_config(format!(
                "age_caliper must be a non-negative number of years, got {}",
                self.age_caliper
            )));
        }
        if self.match_on_visit_date && self.visit_date_caliper < 0 {
            return Err(SamplingError::invalid_config(format!(
                "visit_date_caliper must not be negative, got {}",
                self.visit_date_caliper
            )));
        }
        if self.match_on_time_in_cohort && self.days_in_cohort_caliper < 0 {
            return Err(SamplingError::invalid_config(format!(
                "days_in_cohort_caliper must not be negative, got {}",
                self.days_in_cohort_caliper
            )));
        }
        if self.min_age_days > self.max_age_days {
            return Err(SamplingError::invalid_config(format!(
                "min_age_days ({}) exceeds max_age_days ({})",
                self.min_age_days, self.max_age_days
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SamplingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sampling Configuration:")?;
        writeln!(f, "  Controls per case: {}", self.controls_per_case)?;
        writeln!(f, "  First outcome only: {}", self.first_outcome_only)?;
        writeln!(f, "  Washout period: {} days", self.washout_period)?;
        if self.match_on_age {
            writeln!(
                f,
                "  Age caliper: ±{} years ({} days)",
                self.age_caliper,
                self.age_caliper_days()
            )?;
        }
        writeln!(f, "  Match on gender: {}", self.match_on_gender)?;
        writeln!(f, "  Match on provider: {}", self.match_on_provider)?;
        writeln!(f, "  Match on care site: {}", self.match_on_care_site)?;
        if self.match_on_visit_date {
            writeln!(f, "  Visit date caliper: ±{} days", self.visit_date_caliper)?;
        }
        if self.match_on_time_in_cohort {
            writeln!(
                f,
                "  Time in cohort caliper: ±{} days",
                self.days_in_cohort_caliper
            )?;
        }
        writeln!(
            f,
            "  Age at index: {} to {} days",
            self.min_age_days, self.max_age_days
        )?;
        if let Some(seed) = self.random_seed {
            writeln!(f, "  Random seed: {seed}")?;
        }
        writeln!(f, "  Parallel: {}", self.use_parallel)?;
        Ok(())
    }
}

/// Builder for constructing a sampling configuration
#[derive(Debug, Clone)]
pub struct SamplingConfigBuilder {
    config: SamplingConfig,
}

impl Default for SamplingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SamplingConfig::default(),
        }
    }

    /// Set first-outcome-only mode
    #[must_use]
    pub const fn first_outcome_only(mut self, first_only: bool) -> Self {
        self.config.first_outcome_only = first_only;
        self
    }

    /// Set the washout period in days
    #[must_use]
    pub const fn washout_period(mut self, days: i32) -> Self {
        self.config.washout_period = days;
        self
    }

    /// Set the number of controls per case
    #[must_use]
    pub const fn controls_per_case(mut self, controls: usize) -> Self {
        self.config.controls_per_case = controls;
        self
    }

    /// Enable age matching with the given caliper in years
    #[must_use]
    pub const fn match_on_age(mut self, enabled: bool, caliper_years: f64) -> Self {
        self.config.match_on_age = enabled;
        self.config.age_caliper = caliper_years;
        self
    }

    /// Set whether the same gender is required
    #[must_use]
    pub const fn match_on_gender(mut self, enabled: bool) -> Self {
        self.config.match_on_gender = enabled;
        self
    }

    /// Set whether the same provider is required
    #[must_use]
    pub const fn match_on_provider(mut self, enabled: bool) -> Self {
        self.config.match_on_provider = enabled;
        self
    }

    /// Set whether the same care site is required
    #[must_use]
    pub const fn match_on_care_site(mut self, enabled: bool) -> Self {
        self.config.match_on_care_site = enabled;
        self
    }

    /// Enable visit date matching with the given caliper in days
    #[must_use]
    pub const fn match_on_visit_date(mut self, enabled: bool, caliper_days: i32) -> Self {
        self.config.match_on_visit_date = enabled;
        self.config.visit_date_caliper = caliper_days;
        self
    }

    /// Enable time-in-cohort matching with the given caliper in days
    #[must_use]
    pub const fn match_on_time_in_cohort(mut self, enabled: bool, caliper_days: i32) -> Self {
        self.config.match_on_time_in_cohort = enabled;
        self.config.days_in_cohort_caliper = caliper_days;
        self
    }

    /// Set the age window (in days) at which index dates qualify
    #[must_use]
    pub const fn age_range_days(mut self, min_age_days: i32, max_age_days: i32) -> Self {
        self.config.min_age_days = min_age_days;
        self.config.max_age_days = max_age_days;
        self
    }

    /// Set the random probe budget
    #[must_use]
    pub const fn max_probe_iterations(mut self, iterations: usize) -> Self {
        self.config.max_probe_iterations = iterations;
        self
    }

    /// Set the random seed
    #[must_use]
    pub const fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Set whether to draw a progress bar
    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Build the sampling configuration
    #[must_use]
    pub fn build(self) -> SamplingConfig {
        self.config
    }
}
