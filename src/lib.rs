//! Nested case-control sampling for observational health studies.
//!
//! Given a nesting cohort (people with cohort entries, observation periods and
//! outcome dates) the sampler emits one stratum per case occurrence: the case
//! row plus up to `controls_per_case` matched control rows that were at risk
//! and outcome-free on the case's index date.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod utils;

// Re-export the most common types for easier use
pub use config::{SamplingConfig, SamplingConfigBuilder};
pub use error::{Result, SamplingError};
pub use models::{NestingCohortRecord, ResultRow, ResultSink, ResultTable};
pub use source::{CohortDataSource, InMemoryCohort};

// Sampling engine
pub use algorithm::sampling::{NestedCaseControlSampler, SamplingSummary};

// Synthetic cohorts
pub use algorithm::population::{SyntheticCohortConfig, generate_cohort};

// Arrow types
pub use arrow::record_batch::RecordBatch;
