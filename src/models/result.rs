//! Sampling output rows and the table that accumulates them
//!
//! Rows are appended in emission order. `ResultTable` can be rendered as an
//! Arrow `RecordBatch` for downstream estimation code.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Date32Array, Int64Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use super::types::{Day, PersonId, StratumId};
use crate::error::Result;

/// A single output row: a case or one of its controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultRow {
    pub person_id: PersonId,
    pub date: Day,
    pub is_case: bool,
    pub stratum_id: StratumId,
}

impl ResultRow {
    #[must_use]
    pub const fn case(person_id: PersonId, date: Day, stratum_id: StratumId) -> Self {
        Self {
            person_id,
            date,
            is_case: true,
            stratum_id,
        }
    }

    #[must_use]
    pub const fn control(person_id: PersonId, date: Day, stratum_id: StratumId) -> Self {
        Self {
            person_id,
            date,
            is_case: false,
            stratum_id,
        }
    }
}

/// Destination for emitted rows
pub trait ResultSink {
    /// Append one row
    fn add(&mut self, row: ResultRow);
}

impl ResultSink for Vec<ResultRow> {
    fn add(&mut self, row: ResultRow) {
        self.push(row);
    }
}

/// Accumulated sampling output in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultSink for ResultTable {
    fn add(&mut self, row: ResultRow) {
        self.rows.push(row);
    }
}

impl ResultTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap rows that are already in emission order
    #[must_use]
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    /// Append a batch of rows produced elsewhere, preserving their order
    pub fn extend(&mut self, rows: impl IntoIterator<Item = ResultRow>) {
        self.rows.extend(rows);
    }

    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case rows only
    pub fn cases(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|row| row.is_case)
    }

    /// Control rows only
    pub fn controls(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|row| !row.is_case)
    }

    /// Rows belonging to one stratum
    pub fn stratum(&self, stratum_id: StratumId) -> impl Iterator<Item = &ResultRow> {
        self.rows
            .iter()
            .filter(move |row| row.stratum_id == stratum_id)
    }

    /// Arrow schema of the rendered table
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new("person_id", DataType::Int64, false),
            Field::new("date", DataType::Date32, false),
            Field::new("is_case", DataType::Boolean, false),
            Field::new("stratum_id", DataType::UInt64, false),
        ])
    }

    /// Render the rows as an Arrow `RecordBatch`
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let person_ids: Int64Array = self.rows.iter().map(|r| r.person_id).collect::<Vec<_>>().into();
        let dates: Date32Array = self.rows.iter().map(|r| r.date).collect::<Vec<_>>().into();
        let is_case: BooleanArray = self.rows.iter().map(|r| r.is_case).collect::<Vec<_>>().into();
        let stratum_ids: UInt64Array =
            self.rows.iter().map(|r| r.stratum_id).collect::<Vec<_>>().into();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(person_ids),
            Arc::new(dates),
            Arc::new(is_case),
            Arc::new(stratum_ids),
        ];

        Ok(RecordBatch::try_new(Arc::new(Self::schema()), columns)?)
    }
}
