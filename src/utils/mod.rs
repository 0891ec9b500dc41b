//! Utility functions shared across the sampler

pub mod logging;

pub use logging::progress;
