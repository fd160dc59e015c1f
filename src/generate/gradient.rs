//! Species abundances along a shared environmental gradient.

use crate::error::{Result, SimError};
use nalgebra::DMatrix;
use statrs::distribution::{Continuous, Normal};

/// Evaluate Gaussian response curves for `k` species over a 1-D gradient.
///
/// Species `i` has its optimum at `means[i]`, tolerance `std_devs[i]` and
/// peak height `peaks[i]` (1.0 when `peaks` is `None`). This is the kind of
/// structure seen when species are distributed across a redox tower.
///
/// # Returns
/// An `positions.len() × k` matrix of non-negative abundances (samples ×
/// species).
///
/// # Errors
/// - `DimensionMismatch` if `std_devs` or `peaks` do not match `means`
/// - `InvalidParameter` if a standard deviation is not positive
pub fn gradient(
    positions: &[f64],
    means: &[f64],
    std_devs: &[f64],
    peaks: Option<&[f64]>,
) -> Result<DMatrix<f64>> {
    let n_species = means.len();
    if std_devs.len() != n_species {
        return Err(SimError::DimensionMismatch {
            expected: n_species,
            actual: std_devs.len(),
        });
    }
    if let Some(peaks) = peaks {
        if peaks.len() != n_species {
            return Err(SimError::DimensionMismatch {
                expected: n_species,
                actual: peaks.len(),
            });
        }
    }

    let mut mat = DMatrix::zeros(positions.len(), n_species);
    for (i, (&mean, &sd)) in means.iter().zip(std_devs).enumerate() {
        let density = gaussian(mean, sd)?;
        let peak = peaks.map_or(1.0, |p| p[i]);
        for (r, &x) in positions.iter().enumerate() {
            mat[(r, i)] = peak * density.pdf(x);
        }
    }

    Ok(mat)
}

pub(crate) fn gaussian(mean: f64, std_dev: f64) -> Result<Normal> {
    Normal::new(mean, std_dev).map_err(|e| {
        SimError::InvalidParameter(format!(
            "normal(mean = {}, sd = {}): {}",
            mean, std_dev, e
        ))
    })
}
