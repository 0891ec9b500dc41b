//! Common domain type definitions
//!
//! Dates are carried as whole days since 1970-01-01, the same encoding
//! Arrow uses for `Date32`, so records compare with plain integer arithmetic.

use chrono::NaiveDate;

/// Person identifier
pub type PersonId = i64;

/// Concept, provider or care site identifier
pub type ConceptId = i64;

/// Day-resolution date: days since the Unix epoch
pub type Day = i32;

/// Stratum identifier: one per case occurrence, 1-based
pub type StratumId = u64;

fn epoch() -> NaiveDate {
    chrono::DateTime::<chrono::Utc>::UNIX_EPOCH.date_naive()
}

/// Convert a calendar date to days since the Unix epoch
#[must_use]
pub fn day_from_date(date: NaiveDate) -> Day {
    (date - epoch()).num_days() as Day
}

/// Convert days since the Unix epoch back to a calendar date
#[must_use]
pub fn date_from_day(day: Day) -> Option<NaiveDate> {
    epoch().checked_add_signed(chrono::Duration::days(i64::from(day)))
}

/// Convenience constructor for a day from year, month and day-of-month
#[must_use]
pub fn day_from_ymd(year: i32, month: u32, day: u32) -> Option<Day> {
    NaiveDate::from_ymd_opt(year, month, day).map(day_from_date)
}
