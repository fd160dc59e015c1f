//! Shared input and output checks for the count samplers.

use crate::error::{Result, SimError};
use crate::normalize::closure::{closure, multiplicative_replacement};
use nalgebra::DMatrix;

/// Filtered simulation result with the masks used to filter it.
#[derive(Debug, Clone)]
pub struct SimOutput {
    /// Simulated counts (kept samples × kept features).
    pub counts: DMatrix<f64>,
    /// One entry per input row; `true` if the row had a positive total.
    pub row_mask: Vec<bool>,
    /// One entry per input column; `true` if the column had a positive
    /// total after empty rows were dropped.
    pub col_mask: Vec<bool>,
}

impl SimOutput {
    /// Number of kept samples.
    pub fn n_samples(&self) -> usize {
        self.counts.nrows()
    }

    /// Number of kept features.
    pub fn n_features(&self) -> usize {
        self.counts.ncols()
    }
}

/// Check a composition matrix against its depths and close it.
///
/// `depths` must be a single column with one strictly positive entry per row
/// of `mat`. The returned proportions have rows summing to one with zeros
/// replaced, so every entry is strictly positive.
///
/// # Errors
/// - `InvalidDepth` if any depth is ≤ 0
/// - `InvalidShape` if depths is not a single column or the row counts differ
/// - `NegativeValue` if `mat` has a negative entry
/// - `EmptyRow` if a row of `mat` sums to zero
pub fn validate_input(mat: &DMatrix<f64>, depths: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if let Some((row, &value)) = depths.iter().enumerate().find(|(_, &d)| !(d > 0.0)) {
        // Column-major storage; depth columns beyond the first are rejected below.
        return Err(SimError::InvalidDepth {
            row: row % depths.nrows().max(1),
            value,
        });
    }
    if depths.ncols() != 1 {
        return Err(SimError::InvalidShape(format!(
            "read depth must be a single column, got {} columns",
            depths.ncols()
        )));
    }
    if depths.nrows() != mat.nrows() {
        return Err(SimError::InvalidShape(format!(
            "number of read depths ({}) does not match number of samples ({})",
            depths.nrows(),
            mat.nrows()
        )));
    }

    let closed = closure(mat)?;
    Ok(multiplicative_replacement(&closed))
}

/// Clip negative artifacts and drop all-zero samples and features.
///
/// Rows are filtered first; column totals are taken over the kept rows only.
pub fn validate_output(mut sim: DMatrix<f64>) -> SimOutput {
    sim.apply(|v| {
        if *v < 0.0 {
            *v = 0.0;
        }
    });

    let row_mask: Vec<bool> = sim.row_iter().map(|row| row.sum() > 0.0).collect();
    let kept_rows = mask_indices(&row_mask);
    let sim = sim.select_rows(kept_rows.iter());

    let col_mask: Vec<bool> = sim.column_iter().map(|col| col.sum() > 0.0).collect();
    let kept_cols = mask_indices(&col_mask);
    let counts = sim.select_columns(kept_cols.iter());

    SimOutput {
        counts,
        row_mask,
        col_mask,
    }
}

fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, &keep)| keep)
        .map(|(i, _)| i)
        .collect()
}
