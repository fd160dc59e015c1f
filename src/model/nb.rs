//! Negative Binomial count simulation as a Gamma-Poisson mixture.
//!
//! The latent rate is Gamma with shape `kappa` and scale `kappa * mu`, then a
//! Poisson count is drawn from it. With `kappa = 1` the mean count is `mu`;
//! other values also move the mean by a factor of `kappa²`.

use crate::error::{Result, SimError};
use crate::model::sampling::{check_kappa, expected_counts, poisson_count, sample_rows};
use crate::model::validate::{validate_input, validate_output, SimOutput};
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Simulate counts from a Negative Binomial distribution.
///
/// # Arguments
/// * `mat` - Counts or proportions (samples × features)
/// * `depths` - Read depth per sample (n_samples × 1)
/// * `kappa` - Gamma shape; also multiplies the Gamma scale
/// * `rng` - Random source
pub fn negative_binomial<R: Rng + ?Sized>(
    mat: &DMatrix<f64>,
    depths: &DMatrix<f64>,
    kappa: f64,
    rng: &mut R,
) -> Result<SimOutput> {
    let props = validate_input(mat, depths)?;
    check_kappa(kappa)?;
    let mu = expected_counts(&props, depths);

    log::debug!(
        "Negative Binomial: {} samples x {} features, kappa = {}",
        mu.nrows(),
        mu.ncols(),
        kappa
    );

    let sim = sample_rows(mu.nrows(), mu.ncols(), rng, |i, row_rng| {
        mu.row(i)
            .iter()
            .map(|&m| {
                let latent = Gamma::new(kappa, kappa * m)
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
        DMatrix::from_row_slice(2, 3, &[10.0, 30.0, 60.0, 45.0, 45.0, 10.0])
    }

    #[test]
    fn test_nb_mean_tracks_depth() {
        let mat = counts();
        let depths = DMatrix::from_column_slice(2, 1, &[5_000.0, 20_000.0]);
        let mut rng = StdRng::seed_from_u64(21);

        // Large shape keeps the Gamma tight around kappa² * mu.
        let kappa = 100.0;
        let out = negative_binomial(&mat, &depths, kappa, &mut rng).unwrap();
        let scale = kappa * kappa;
        let first = out.counts.row(0).sum() / scale;
        let second = out.counts.row(1).sum() / scale;

        assert!((first - 5_000.0).abs() < 1_250.0, "first = {}", first);
        assert!((second - 20_000.0).abs() < 5_000.0, "second = {}", second);
    }

    #[test]
    fn test_nb_is_reproducible() {
        let mat = counts();
        let depths = DMatrix::from_element(2, 1, 300.0);

        let a = negative_binomial(&mat, &depths, 1.0, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = negative_binomial(&mat, &depths, 1.0, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.row_mask, b.row_mask);
    }

    #[test]
    fn test_nb_invalid_depth() {
        let mat = counts();
        let depths = DMatrix::from_column_slice(2, 1, &[100.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(6);
        assert!(matches!(
            negative_binomial(&mat, &depths, 1.0, &mut rng),
            Err(SimError::InvalidDepth { row: 1, .. })
        ));
    }
}
