//! Simplex closure and multiplicative zero replacement.
//!
//! Both operate row-wise on samples × features matrices: each row is one
//! composition.

use crate::error::{Result, SimError};
use nalgebra::DMatrix;

/// Normalize every row of a non-negative matrix to sum to one.
///
/// # Errors
/// - `NegativeValue` if any entry is negative
/// - `EmptyRow` if a row sums to zero
pub fn closure(mat: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let (n_rows, n_cols) = mat.shape();
    let mut closed = mat.clone();

    for i in 0..n_rows {
        let mut total = 0.0;
        for j in 0..n_cols {
            let value = mat[(i, j)];
            if value < 0.0 {
                return Err(SimError::NegativeValue { value, row: i, col: j });
            }
            total += value;
        }
        if !(total > 0.0) {
            return Err(SimError::EmptyRow(i));
        }
        for j in 0..n_cols {
            closed[(i, j)] /= total;
        }
    }

    Ok(closed)
}

/// Replace zeros in closed compositions with a small delta.
///
/// Uses delta = (1/D)², where D is the number of components. Non-zero parts
/// of a row are shrunk by `1 - z * delta` (z = zeros in the row) so rows
/// still sum to one and every entry is strictly positive.
pub fn multiplicative_replacement(closed: &DMatrix<f64>) -> DMatrix<f64> {
    let (n_rows, n_cols) = closed.shape();
    if n_cols == 0 {
        return closed.clone();
    }
    let delta = (1.0 / n_cols as f64).powi(2);
    let mut replaced = closed.clone();

    for i in 0..n_rows {
        let n_zeros = (0..n_cols).filter(|&j| closed[(i, j)] == 0.0).count();
        if n_zeros == 0 {
            continue;
        }
        let shrink = 1.0 - n_zeros as f64 * delta;
        for j in 0..n_cols {
            replaced[(i, j)] = if closed[(i, j)] == 0.0 {
                delta
            } else {
                closed[(i, j)] * shrink
            };
        }
    }

    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closure_rows_sum_to_one() {
        let mat = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 7.0, 0.0, 5.0, 5.0]);
        let closed = closure(&mat).unwrap();

        assert_relative_eq!(closed[(0, 2)], 0.7, epsilon = 1e-12);
        assert_relative_eq!(closed[(1, 0)], 0.0, epsilon = 1e-12);
        for i in 0..2 {
            assert_relative_eq!(closed.row(i).sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_closure_errors() {
        let zero_row = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 0.0]);
        assert!(matches!(closure(&zero_row), Err(SimError::EmptyRow(1))));

        let negative = DMatrix::from_row_slice(1, 2, &[1.0, -0.5]);
        assert!(matches!(
            closure(&negative),
            Err(SimError::NegativeValue { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_multiplicative_replacement() {
        let mat = DMatrix::from_row_slice(1, 4, &[0.5, 0.5, 0.0, 0.0]);
        let replaced = multiplicative_replacement(&mat);
        let delta = 1.0 / 16.0;

        assert_relative_eq!(replaced[(0, 2)], delta, epsilon = 1e-12);
        assert_relative_eq!(replaced[(0, 0)], 0.5 * (1.0 - 2.0 * delta), epsilon = 1e-12);
        assert_relative_eq!(replaced.row(0).sum(), 1.0, epsilon = 1e-12);
        assert!(replaced.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_replacement_leaves_positive_rows() {
        let mat = DMatrix::from_row_slice(1, 2, &[0.25, 0.75]);
        assert_eq!(multiplicative_replacement(&mat), mat);
    }
}
