//! Algorithm implementations for nested case-control studies
//!
//! `sampling` holds the control selection engine; `population` generates
//! synthetic nesting cohorts to drive it.

pub mod population;
pub mod sampling;
