//! Additive Log-Ratio (ALR) transformation for compositional data.
//!
//! ALR maps a composition of D strictly positive parts to D-1 unconstrained
//! coordinates by taking the log-ratio of each part to a reference part. Here
//! the reference is always the last column, and rows are compositions
//! (samples × features).
//!
//! | Property | ALR | ALR inverse |
//! |----------|-----|-------------|
//! | Input columns | D | D-1 |
//! | Output columns | D-1 | D |
//! | Output rows sum | unconstrained | 1 |

use crate::error::{Result, SimError};
use crate::normalize::closure::closure;
use nalgebra::DMatrix;

/// Apply the additive log-ratio transform to each row.
///
/// # Formula
/// ALR(x)_ij = ln(x_ij / x_i,D) for j < D
///
/// # Errors
/// - `InvalidParameter` if there are fewer than 2 columns
/// - `Numerical` if any entry is not strictly positive
pub fn alr(mat: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let (n_rows, n_cols) = mat.shape();

    if n_cols < 2 {
        return Err(SimError::InvalidParameter(
            "ALR requires at least 2 components".to_string(),
        ));
    }

    for i in 0..n_rows {
        for j in 0..n_cols {
            let val = mat[(i, j)];
            if !(val > 0.0) {
                return Err(SimError::Numerical(format!(
                    "ALR requires positive values; found {} at ({}, {})",
                    val, i, j
                )));
            }
        }
    }

    let reference = n_cols - 1;
    Ok(DMatrix::from_fn(n_rows, reference, |i, j| {
        mat[(i, j)].ln() - mat[(i, reference)].ln()
    }))
}

/// Invert [`alr`]: append the zero reference coordinate, exponentiate, close.
pub fn alr_inv(coords: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let (n_rows, n_coords) = coords.shape();
    let expanded = DMatrix::from_fn(n_rows, n_coords + 1, |i, j| {
        if j < n_coords {
            coords[(i, j)].exp()
        } else {
            1.0
        }
    });
    closure(&expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_alr_manual_calculation() {
        let mat = DMatrix::from_row_slice(2, 3, &[2.0, 8.0, 4.0, 8.0, 2.0, 4.0]);
        let coords = alr(&mat).unwrap();

        assert_eq!(coords.shape(), (2, 2));
        assert_relative_eq!(coords[(0, 0)], 0.5_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(coords[(0, 1)], 2.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(coords[(1, 0)], 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_alr_inverse_recovers_closure() {
        let mat = DMatrix::from_row_slice(
            3,
            4,
            &[
                24.0, 28.0, 98.0, 1.0, //
                0.1, 0.2, 0.3, 0.4, //
                139.0, 15.0, 46.0, 3.0,
            ],
        );
        let back = alr_inv(&alr(&mat).unwrap()).unwrap();
        let expected = closure(&mat).unwrap();

        for (a, b) in back.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_alr_rejects_zeros() {
        let mat = DMatrix::from_row_slice(1, 3, &[1.0, 0.0, 2.0]);
        assert!(matches!(alr(&mat), Err(SimError::Numerical(_))));
    }

    #[test]
    fn test_alr_requires_two_components() {
        let mat = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        assert!(matches!(alr(&mat), Err(SimError::InvalidParameter(_))));
    }
}
