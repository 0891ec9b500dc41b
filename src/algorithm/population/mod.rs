//! Synthetic nesting cohorts
//!
//! This module provides functionality for generating reproducible
//! nesting cohorts for demonstration runs, tests and benchmarks.

pub mod config;
pub mod generator;

// Re-export commonly used items
pub use config::SyntheticCohortConfig;
pub use generator::generate_cohort;
