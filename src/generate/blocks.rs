//! Block-diagonal abundance tables.
//!
//! Samples are split into row bands and features into column bands; each
//! band pair along the diagonal holds a Gaussian-shaped block, so groups of
//! samples are dominated by their own subset of features.

use crate::error::{Result, SimError};
use crate::generate::gradient::gaussian;
use crate::generate::linspace;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::distribution::Continuous;

/// Position on the 0..10 axis at which block rows are evaluated.
const BLOCK_CENTER: f64 = 5.0;

/// Layout of a block-diagonal table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Number of columns (features).
    pub n_cols: usize,
    /// Number of rows (samples).
    pub n_rows: usize,
    /// Number of blocks, must be greater than one.
    pub n_blocks: usize,
    /// Number of columns shared between neighbouring blocks.
    pub overlap: usize,
    /// Floor applied to every output value.
    pub minval: f64,
    /// Standard deviation of the Gaussian profiles.
    pub sigma: f64,
    /// Multiplier for the block values.
    pub maxval: f64,
}

impl BlockConfig {
    /// Layout with no overlap, `sigma = 2` and values in `[0, maxval = 1]`.
    pub fn new(n_cols: usize, n_rows: usize, n_blocks: usize) -> Self {
        Self {
            n_cols,
            n_rows,
            n_blocks,
            overlap: 0,
            minval: 0.0,
            sigma: 2.0,
            maxval: 1.0,
        }
    }

    /// Set the column overlap between neighbouring blocks.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the Gaussian standard deviation.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the value range.
    pub fn with_range(mut self, minval: f64, maxval: f64) -> Self {
        self.minval = minval;
        self.maxval = maxval;
        self
    }
}

/// Generate an `n_rows × n_cols` block-diagonal table.
///
/// The background is a smooth gradient (rows evaluated on `linspace(0, 10,
/// n_rows)`, feature optima on `linspace(0, 10, n_cols)`). The first
/// `n_blocks - 1` blocks have `n_rows / n_blocks` rows and
/// `n_cols / (2 * n_blocks) + overlap` columns; every block after the first
/// starts `overlap / 2` columns before its nominal start. The last block
/// takes all remaining rows and starts `overlap` columns before the previous
/// block's nominal end.
///
/// # Errors
/// - `InvalidBlockCount` if `n_blocks <= 1`
/// - `InvalidParameter` if `sigma` is not positive
pub fn blocks(config: &BlockConfig) -> Result<DMatrix<f64>> {
    let BlockConfig {
        n_cols,
        n_rows,
        n_blocks,
        overlap,
        minval,
        sigma,
        maxval,
    } = *config;

    if n_blocks <= 1 {
        return Err(SimError::InvalidBlockCount(n_blocks));
    }

    let rows_axis = linspace(0.0, 10.0, n_rows);
    let optima = linspace(0.0, 10.0, n_cols);
    let mut mat = DMatrix::zeros(n_rows, n_cols);
    for (c, &mu) in optima.iter().enumerate() {
        let density = gaussian(mu, sigma)?;
        for (r, &x) in rows_axis.iter().enumerate() {
            mat[(r, c)] = density.pdf(x);
        }
    }

    let block_cols = n_cols / (n_blocks * 2);
    let block_rows = n_rows / n_blocks;
    let block = diagonal_block(block_rows, block_cols + overlap, sigma, maxval)?;

    let mut upper_row = 0;
    let mut upper_col = 0;
    for b in 0..n_blocks - 1 {
        let lower_row = block_rows * b;
        let lower_col = block_cols * b;
        upper_row = (block_rows * (b + 1)).min(n_rows);
        upper_col = (block_cols * (b + 1)).min(n_cols);

        let start_col = if b == 0 {
            lower_col
        } else {
            lower_col.saturating_sub(overlap / 2)
        };
        paste(&mut mat, &block, lower_row, start_col);
    }

    let last_col = upper_col.saturating_sub(overlap);
    let tail = diagonal_block(n_rows - upper_row, n_cols - last_col, sigma, maxval)?;
    paste(&mut mat, &tail, upper_row, last_col);

    log::debug!(
        "generated {} x {} block table with {} blocks (overlap {})",
        n_rows,
        n_cols,
        n_blocks,
        overlap
    );

    mat.apply(|v| *v = f64::max(*v, minval));
    Ok(mat)
}

/// Block whose rows all sit at the axis center and whose columns have optima
/// spread over `linspace(0, 10, n_cols)`.
fn diagonal_block(n_rows: usize, n_cols: usize, sigma: f64, maxval: f64) -> Result<DMatrix<f64>> {
    let optima = linspace(0.0, 10.0, n_cols);
    let profile = optima
        .iter()
        .map(|&mu| Ok(gaussian(mu, sigma)?.pdf(BLOCK_CENTER) * maxval))
        .collect::<Result<Vec<f64>>>()?;
    Ok(DMatrix::from_fn(n_rows, n_cols, |_, c| profile[c]))
}

/// Copy `block` into `mat` at (row, col), clipping at the matrix edges.
fn paste(mat: &mut DMatrix<f64>, block: &DMatrix<f64>, row: usize, col: usize) {
    let rows = block.nrows().min(mat.nrows().saturating_sub(row));
    let cols = block.ncols().min(mat.ncols().saturating_sub(col));
    if rows == 0 || cols == 0 {
        return;
    }
    mat.view_mut((row, col), (rows, cols))
        .copy_from(&block.view((0, 0), (rows, cols)));
}
