//! Candidate index ranges
//!
//! Controls are drawn from a contiguous index range of the eligibility store:
//! either the whole store, or the window of records whose date of birth lies
//! within the age caliper of the case. The window is found with two binary
//! searches over the birth-sorted store.

use rand::distr::Uniform;

use crate::error::{Result, SamplingError};
use crate::models::{Day, EligibilityRecord};

/// Inclusive range of store indices eligible for probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRange {
    /// First index in the range
    pub lower: usize,
    /// Last index in the range (inclusive)
    pub upper: usize,
}

#[allow(clippy::len_without_is_empty)]
impl CandidateRange {
    /// Range covering a whole store of `len` records; `None` when empty
    #[must_use]
    pub fn full(len: usize) -> Option<Self> {
        len.checked_sub(1).map(|upper| Self { lower: 0, upper })
    }

    /// Number of indices in the range; never zero
    #[must_use]
    pub const fn len(&self) -> usize {
        self.upper - self.lower + 1
    }

    /// Iterate over the indices in the range
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.lower..=self.upper
    }

    /// Uniform distribution over the indices in the range
    pub fn distribution(&self) -> Result<Uniform<usize>> {
        Uniform::new_inclusive(self.lower, self.upper)
            .map_err(|_| SamplingError::EmptyEligibilityStore)
    }
}

/// Smallest index whose date of birth is at least `key`
///
/// Returns `records.len()` when every record is born before `key`.
#[must_use]
pub fn birth_lower_bound(records: &[EligibilityRecord], key: Day) -> usize {
    records.partition_point(|record| record.date_of_birth < key)
}

/// Largest index at or after `lower` whose date of birth is at most `key`
///
/// Returns `None` when no record from `lower` onwards qualifies.
#[must_use]
pub fn birth_upper_bound(records: &[EligibilityRecord], lower: usize, key: Day) -> Option<usize> {
    let tail = records.get(lower..)?;
    let count = tail.partition_point(|record| record.date_of_birth <= key);
    count.checked_sub(1).map(|offset| lower + offset)
}

/// Records born within `caliper_days` of `date_of_birth`
///
/// `records` must be sorted ascending by date of birth. An empty window is
/// reported as `None`, which callers treat as "no controls available".
#[must_use]
pub fn age_caliper_range(
    records: &[EligibilityRecord],
    date_of_birth: Day,
    caliper_days: i32,
) -> Option<CandidateRange> {
    debug_assert!(
        records.is_sorted_by_key(|record| record.date_of_birth),
        "eligibility store must be sorted by date of birth for age caliper search"
    );

    let low_key = date_of_birth.saturating_sub(caliper_days);
    let high_key = date_of_birth.saturating_add(caliper_days);

    let lower = birth_lower_bound(records, low_key);
    let upper = birth_upper_bound(records, lower, high_key)?;
    Some(CandidateRange { lower, upper })
}
