//! Cohort data source
//!
//! The sampler consumes nesting-cohort records exactly once while building
//! its eligibility store. Anything that can be turned into an iterator of
//! `NestingCohortRecord`s is a source, which covers plain vectors, lazy
//! generators and adapters over external storage alike.

use crate::models::NestingCohortRecord;

/// A one-shot, lazily consumed sequence of nesting-cohort records
pub trait CohortDataSource {
    /// Iterator over the records
    type Records: Iterator<Item = NestingCohortRecord>;

    /// Consume the source, yielding its records
    fn into_records(self) -> Self::Records;
}

impl<I> CohortDataSource for I
where
    I: IntoIterator<Item = NestingCohortRecord>,
{
    type Records = I::IntoIter;

    fn into_records(self) -> Self::Records {
        self.into_iter()
    }
}

/// An in-memory nesting cohort assembled record by record
#[derive(Debug, Clone, Default)]
pub struct InMemoryCohort {
    records: Vec<NestingCohortRecord>,
}

impl InMemoryCohort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the cohort
    pub fn push(&mut self, record: NestingCohortRecord) {
        self.records.push(record);
    }

    /// Add a record, builder style
    #[must_use]
    pub fn with_record(mut self, record: NestingCohortRecord) -> Self {
        self.records.push(record);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[NestingCohortRecord] {
        &self.records
    }
}

impl From<Vec<NestingCohortRecord>> for InMemoryCohort {
    fn from(records: Vec<NestingCohortRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<NestingCohortRecord> for InMemoryCohort {
    fn from_iter<T: IntoIterator<Item = NestingCohortRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for InMemoryCohort {
    type Item = NestingCohortRecord;
    type IntoIter = std::vec::IntoIter<NestingCohortRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
