//! Nested case-control sampler
//!
//! Owns the eligibility store and case index built from a cohort data source
//! and runs the stratification loop over them with a caller-supplied random
//! generator.

use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::parallel::stratify_parallel;
use super::selector::ControlSelector;
use super::statistics::SamplingSummary;
use super::store::{CaseIndex, EligibilityStore, StoreBuildStats, build_store};
use super::stratify::stratify_sequential;
use crate::config::SamplingConfig;
use crate::error::Result;
use crate::models::ResultTable;
use crate::source::CohortDataSource;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};
use crate::utils::progress;

/// Selects matched controls for every case in a nesting cohort
#[derive(Debug)]
pub struct NestedCaseControlSampler {
    config: SamplingConfig,
    store: EligibilityStore,
    case_index: CaseIndex,
    build_stats: StoreBuildStats,
}

impl NestedCaseControlSampler {
    /// Validate the configuration and load the cohort into memory
    pub fn new<S: CohortDataSource>(config: SamplingConfig, source: S) -> Result<Self> {
        config.validate()?;

        let (store, case_index, build_stats) = build_store(source, &config);

        if config.match_on_visit_date && !store.is_empty() && !store.has_visit_dates() {
            log_warning(
                "Visit date matching is enabled but no cohort entry has visit dates; no controls can match",
            );
        }

        Ok(Self {
            config,
            store,
            case_index,
            build_stats,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SamplingConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &EligibilityStore {
        &self.store
    }

    #[must_use]
    pub const fn case_index(&self) -> &CaseIndex {
        &self.case_index
    }

    #[must_use]
    pub const fn build_stats(&self) -> &StoreBuildStats {
        &self.build_stats
    }

    /// Select controls for every case, drawing from `rng`
    ///
    /// With `use_parallel` set, one value is drawn from `rng` as the base seed
    /// for the per-stratum streams.
    pub fn select_controls<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ResultTable> {
        let mut table = ResultTable::new();
        if self.case_index.is_empty() {
            return Ok(table);
        }

        let start = Instant::now();
        log_operation_start("Finding controls per case", self.case_index.len());

        let selector = ControlSelector::new(self.store.records(), &self.config)?;
        let pb = progress::create_main_progress_bar(
            self.case_index.len() as u64,
            Some("Finding controls per case"),
            self.config.show_progress,
        );

        let strata = if self.config.use_parallel {
            let base_seed = rng.next_u64();
            stratify_parallel(
                &self.case_index,
                &selector,
                self.config.first_outcome_only,
                base_seed,
                &mut table,
                &pb,
            )?
        } else {
            stratify_sequential(
                &self.case_index,
                &selector,
                self.config.first_outcome_only,
                rng,
                &mut table,
                &pb,
            )?
        };

        progress::finish_progress_bar(&pb, Some("Control selection complete"));
        log_operation_complete("sampled", table.len(), Some(start.elapsed()));
        info!(
            "Selected {} controls across {} strata",
            table.controls().count(),
            strata
        );

        Ok(table)
    }

    /// Select controls with a generator seeded from `seed`
    pub fn select_controls_seeded(&self, seed: u64) -> Result<ResultTable> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.select_controls(&mut rng)
    }

    /// Select controls using the configured seed, or OS entropy without one
    pub fn run(&self) -> Result<ResultTable> {
        match self.config.random_seed {
            Some(seed) => self.select_controls_seeded(seed),
            None => {
                let mut rng = StdRng::from_os_rng();
                self.select_controls(&mut rng)
            }
        }
    }

    /// Summarize a table produced by this sampler
    #[must_use]
    pub fn summarize(&self, table: &ResultTable) -> SamplingSummary {
        SamplingSummary::from_table(table, self.config.controls_per_case)
    }
}
