//! Domain models for nested case-control sampling
//!
//! Input cohort records, the per-person case index entries derived from
//! them, and the output rows of a sampling run.

pub mod case;
pub mod cohort;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use case::{CaseData, IndexDate};
pub use cohort::{EligibilityRecord, NestingCohortRecord};
pub use result::{ResultRow, ResultSink, ResultTable};
pub use types::{ConceptId, Day, PersonId, StratumId, date_from_day, day_from_date, day_from_ymd};
