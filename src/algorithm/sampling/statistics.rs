//! Summary statistics for a sampling run

use std::fmt;

use itertools::Itertools;

use crate::models::ResultTable;

/// Counts describing how well strata were filled
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingSummary {
    /// Number of strata (one case row each)
    pub strata: usize,
    /// Number of control rows
    pub controls: usize,
    /// Strata without a single control
    pub strata_without_controls: usize,
    /// Strata with some but fewer than the requested controls
    pub strata_partially_matched: usize,
    /// Strata that reached the requested number of controls
    pub strata_fully_matched: usize,
    /// Requested controls per case
    pub controls_per_case: usize,
}

impl SamplingSummary {
    /// Summarize a result table
    ///
    /// Rows of one stratum are contiguous in emission order.
    #[must_use]
    pub fn from_table(table: &ResultTable, controls_per_case: usize) -> Self {
        let mut summary = Self {
            controls_per_case,
            ..Self::default()
        };

        for (_, rows) in &table.rows().iter().chunk_by(|row| row.stratum_id) {
            let controls = rows.filter(|row| !row.is_case).count();
            summary.strata += 1;
            summary.controls += controls;
            match controls {
                0 => summary.strata_without_controls += 1,
                n if n < controls_per_case => summary.strata_partially_matched += 1,
                _ => summary.strata_fully_matched += 1,
            }
        }

        summary
    }

    /// Mean controls per stratum
    #[must_use]
    pub fn mean_controls(&self) -> f64 {
        if self.strata == 0 {
            0.0
        } else {
            self.controls as f64 / self.strata as f64
        }
    }
}

impl fmt::Display for SamplingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sampling Summary:")?;
        writeln!(f, "  Strata (cases): {}", self.strata)?;
        writeln!(f, "  Controls: {}", self.controls)?;
        writeln!(
            f,
            "  Mean controls per case: {:.2} (requested {})",
            self.mean_controls(),
            self.controls_per_case
        )?;
        writeln!(f, "  Fully matched strata: {}", self.strata_fully_matched)?;
        writeln!(
            f,
            "  Partially matched strata: {}",
            self.strata_partially_matched
        )?;
        writeln!(
            f,
            "  Strata without controls: {}",
            self.strata_without_controls
        )?;
        Ok(())
    }
}
