//! Nested case-control sampling
//!
//! For every case occurrence in a nesting cohort this module selects a
//! bounded set of matched controls eligible on the same index date:
//!
//! 1. Eligibility store and case index construction
//! 2. Age caliper range queries over the birth-sorted store
//! 3. The match predicate
//! 4. Two-phase control selection (random probing, exhaustive fallback)
//! 5. The stratification loop, sequential or on the rayon pool

pub mod parallel;
pub mod predicate;
pub mod range;
pub mod sampler;
pub mod selector;
pub mod statistics;
pub mod store;
pub mod stratify;

// Re-export key types
pub use predicate::{MatchCriteria, MatchResult};
pub use range::{CandidateRange, age_caliper_range};
pub use sampler::NestedCaseControlSampler;
pub use selector::{ControlSelector, SelectionOutcome, SelectionPhase, StratumCase};
pub use statistics::SamplingSummary;
pub use store::{CaseIndex, EligibilityStore, StoreBuildStats, build_store};
pub use stratify::{PlannedStratum, StratumCounter, plan_strata, stratify_sequential};
