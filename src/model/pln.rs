//! Poisson Log-Normal count simulation.
//!
//! Each count is Poisson with a log-normally distributed rate whose log-mean
//! is the expected count. The log-scale standard deviation `kappa` adds
//! over-dispersion beyond Poisson; larger `kappa` means more dispersion.

use crate::error::{Result, SimError};
use crate::model::sampling::{check_kappa, expected_counts, poisson_count, sample_rows};
use crate::model::validate::{validate_input, validate_output, SimOutput};
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};

/// Simulate counts from a Poisson Log-Normal distribution.
///
/// # Arguments
/// * `mat` - Counts or proportions (samples × features)
/// * `depths` - Read depth per sample (n_samples × 1)
/// * `kappa` - Log-scale standard deviation of the latent rate
/// * `rng` - Random source
///
/// # Returns
/// Simulated counts with all-zero samples and features removed, plus masks.
pub fn poisson_lognormal<R: Rng + ?Sized>(
    mat: &DMatrix<f64>,
    depths: &DMatrix<f64>,
    kappa: f64,
    rng: &mut R,
) -> Result<SimOutput> {
    let props = validate_input(mat, depths)?;
    check_kappa(kappa)?;
    let mu = expected_counts(&props, depths);

    log::debug!(
        "Poisson Log-Normal: {} samples x {} features, kappa = {}",
        mu.nrows(),
        mu.ncols(),
        kappa
    );

    let sim = sample_rows(mu.nrows(), mu.ncols(), rng, |i, row_rng| {
        mu.row(i)
            .iter()
            .map(|&m| {
                let latent = LogNormal::new(m.ln(), kappa)
                    .map_err(|e| SimError::InvalidParameter(e.to_string()))?;
                poisson_count(latent.sample(row_rng), row_rng)
            })
            .collect()
    })?;

    Ok(validate_output(sim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn counts() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            4,
            &[
                50.0, 30.0, 20.0, 0.0, //
                5.0, 5.0, 80.0, 10.0, //
                0.0, 0.0, 40.0, 60.0,
            ],
        )
    }

    #[test]
    fn test_pln_counts_are_integral() {
        let mat = counts();
        let depths = DMatrix::from_element(3, 1, 1000.0);
        let mut rng = StdRng::seed_from_u64(1);

        let out = poisson_lognormal(&mat, &depths, 0.5, &mut rng).unwrap();
        assert_eq!(out.row_mask.len(), 3);
        assert_eq!(out.col_mask.len(), 4);
        assert!(out.counts.iter().all(|&c| c >= 0.0 && c.fract() == 0.0));
    }

    #[test]
    fn test_pln_depth_is_approximate() {
        let mat = counts();
        let depths = DMatrix::from_element(3, 1, 10_000.0);
        let mut rng = StdRng::seed_from_u64(2);

        let out = poisson_lognormal(&mat, &depths, 0.1, &mut rng).unwrap();
        for row in out.counts.row_iter() {
            let total = row.sum();
            assert!(total > 8_000.0 && total < 12_000.0, "total = {}", total);
        }
    }

    #[test]
    fn test_pln_rejects_bad_kappa() {
        let mat = counts();
        let depths = DMatrix::from_element(3, 1, 100.0);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            poisson_lognormal(&mat, &depths, 0.0, &mut rng),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_pln_propagates_validation_errors() {
        let mat = counts();
        let depths = DMatrix::from_element(2, 1, 100.0);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            poisson_lognormal(&mat, &depths, 1.0, &mut rng),
            Err(SimError::InvalidShape(_))
        ));
    }
}
