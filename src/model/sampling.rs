//! Row-parallel sampling machinery shared by the count samplers.

use crate::error::{Result, SimError};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution, Poisson};
use rayon::prelude::*;

/// Draw every row of an `n_rows × n_cols` matrix independently.
///
/// One seed per row is taken from `rng` up front, so the result only depends
/// on the state of `rng` and not on how rayon schedules the rows.
pub(crate) fn sample_rows<R, F>(
    n_rows: usize,
    n_cols: usize,
    rng: &mut R,
    draw_row: F,
) -> Result<DMatrix<f64>>
where
    R: Rng + ?Sized,
    F: Fn(usize, &mut StdRng) -> Result<Vec<f64>> + Sync + Send,
{
    let seeds: Vec<u64> = (0..n_rows).map(|_| rng.gen()).collect();

    let rows: Vec<Vec<f64>> = seeds
        .into_par_iter()
        .enumerate()
        .map(|(i, seed)| {
            let mut row_rng = StdRng::seed_from_u64(seed);
            draw_row(i, &mut row_rng)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut sim = DMatrix::zeros(n_rows, n_cols);
    for (i, row) in rows.iter().enumerate() {
        for (j, &val) in row.iter().enumerate() {
            sim[(i, j)] = val;
        }
    }
    Ok(sim)
}

/// Draw a Poisson count for a latent rate; a zero rate gives a zero count.
pub(crate) fn poisson_count<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> Result<f64> {
    if rate == 0.0 {
        return Ok(0.0);
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(SimError::Numerical(format!(
            "latent Poisson rate must be finite and non-negative, got {}",
            rate
        )));
    }
    let poisson = Poisson::new(rate).map_err(|e| SimError::Numerical(e.to_string()))?;
    Ok(poisson.sample(rng))
}

/// Multinomial draw of `n` trials over `probs` via conditional binomials.
///
/// The counts always sum to `n`. `probs` need not be exactly normalized.
pub(crate) fn multinomial<R: Rng + ?Sized>(n: u64, probs: &[f64], rng: &mut R) -> Result<Vec<f64>> {
    let mut counts = vec![0.0; probs.len()];
    let mut remaining_n = n;
    let mut remaining_p: f64 = probs.iter().sum();
    let last = probs.len().saturating_sub(1);

    for (k, &p) in probs.iter().enumerate() {
        if remaining_n == 0 {
            break;
        }
        if k == last {
            counts[k] = remaining_n as f64;
            break;
        }
        let q = if remaining_p > 0.0 {
            (p / remaining_p).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let binomial =
            Binomial::new(remaining_n, q).map_err(|e| SimError::Numerical(e.to_string()))?;
        let x = binomial.sample(rng);
        counts[k] = x as f64;
        remaining_n -= x;
        remaining_p -= p;
    }

    Ok(counts)
}

/// Per-sample expected counts: `mu_ij = depth_i * p_ij`.
pub(crate) fn expected_counts(props: &DMatrix<f64>, depths: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(props.nrows(), props.ncols(), |i, j| {
        depths[(i, 0)] * props[(i, j)]
    })
}

pub(crate) fn check_kappa(kappa: f64) -> Result<()> {
    if !(kappa > 0.0) || !kappa.is_finite() {
        return Err(SimError::InvalidParameter(format!(
            "kappa must be positive and finite, got {}",
            kappa
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multinomial_sums_to_trials() {
        let mut rng = StdRng::seed_from_u64(7);
        let probs = [0.1, 0.2, 0.3, 0.4];
        for n in [0u64, 1, 17, 1000] {
            let counts = multinomial(n, &probs, &mut rng).unwrap();
            assert_eq!(counts.iter().sum::<f64>(), n as f64);
        }
    }

    #[test]
    fn test_multinomial_respects_zero_probability() {
        let mut rng = StdRng::seed_from_u64(11);
        let counts = multinomial(500, &[0.5, 0.0, 0.5], &mut rng).unwrap();
        assert_eq!(counts[1], 0.0);
        assert_eq!(counts[0] + counts[2], 500.0);
    }

    #[test]
    fn test_poisson_count_zero_rate() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(poisson_count(0.0, &mut rng).unwrap(), 0.0);
        assert!(poisson_count(f64::INFINITY, &mut rng).is_err());
        assert!(poisson_count(f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_sample_rows_is_reproducible() {
        let draw = |i: usize, rng: &mut StdRng| -> Result<Vec<f64>> {
            Ok(vec![i as f64, rng.gen::<f64>()])
        };
        let a = sample_rows(5, 2, &mut StdRng::seed_from_u64(42), draw).unwrap();
        let b = sample_rows(5, 2, &mut StdRng::seed_from_u64(42), draw).unwrap();

        assert_eq!(a, b);
        assert_eq!(a[(3, 0)], 3.0);
    }

    #[test]
    fn test_check_kappa() {
        assert!(check_kappa(1.0).is_ok());
        assert!(check_kappa(0.0).is_err());
        assert!(check_kappa(-2.0).is_err());
        assert!(check_kappa(f64::NAN).is_err());
    }
}
