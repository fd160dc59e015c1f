//! Dirichlet-Multinomial and Multinomial count simulation.
//!
//! Multinomial draws place exactly `depth` reads in every sample. The
//! Dirichlet path first draws a per-sample composition, which adds
//! between-sample variability on top of the multinomial noise.

use crate::error::{Result, SimError};
use crate::model::sampling::{multinomial, sample_rows};
use crate::model::validate::{validate_input, validate_output, SimOutput};
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};

/// Simulate counts from a (Dirichlet-)Multinomial distribution.
///
/// # Arguments
/// * `mat` - Counts or proportions (samples × features)
/// * `depths` - Read depth per sample (n_samples × 1), rounded to whole reads
/// * `use_dirichlet` - Draw each sample's composition from a Dirichlet first
/// * `pseudocount` - Added to `mat` before closure; only used with the
///   Dirichlet path
/// * `rng` - Random source
pub fn dirichlet_multinomial<R: Rng + ?Sized>(
    mat: &DMatrix<f64>,
    depths: &DMatrix<f64>,
    use_dirichlet: bool,
    pseudocount: f64,
    rng: &mut R,
) -> Result<SimOutput> {
    let props = if use_dirichlet {
        validate_input(&mat.add_scalar(pseudocount), depths)?
    } else {
        validate_input(mat, depths)?
    };

    log::debug!(
        "{}: {} samples x {} features",
        if use_dirichlet { "Dirichlet-Multinomial" } else { "Multinomial" },
        props.nrows(),
        props.ncols()
    );

    let sim = sample_rows(props.nrows(), props.ncols(), rng, |i, row_rng| {
        let alpha: Vec<f64> = props.row(i).iter().copied().collect();
        let trials = depths[(i, 0)].round() as u64;
        let probs = if use_dirichlet {
            dirichlet_draw(&alpha, row_rng)?
        } else {
            alpha
        };
        multinomial(trials, &probs, row_rng)
    })?;

    Ok(validate_output(sim))
}

fn dirichlet_draw<R: Rng + ?Sized>(alpha: &[f64], rng: &mut R) -> Result<Vec<f64>> {
    if alpha.len() < 2 {
        return Ok(alpha.to_vec());
    }
    let dirichlet = Dirichlet::new(alpha).map_err(|e| SimError::InvalidParameter(e.to_string()))?;
    let draw: Vec<f64> = dirichlet.sample(rng);

    // Very small concentrations can underflow every Gamma component to zero.
    if draw.iter().all(|p| p.is_finite()) && draw.iter().sum::<f64>() > 0.0 {
        Ok(draw)
    } else {
        log::warn!("degenerate Dirichlet draw, falling back to the mean composition");
        Ok(alpha.to_vec())
    }
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
                24.0, 28.0, 98.0, 0.0, //
                139.0, 15.0, 46.0, 3.0, //
                0.0, 1.0, 18.0, 13.0,
            ],
        )
    }

    fn row_sums(mat: &DMatrix<f64>) -> DMatrix<f64> {
        let sums: Vec<f64> = mat.row_iter().map(|r| r.sum()).collect();
        DMatrix::from_column_slice(sums.len(), 1, &sums)
    }

    #[test]
    fn test_multinomial_rows_match_depth() {
        let mat = counts();
        let depths = row_sums(&mat);
        let mut rng = StdRng::seed_from_u64(8);

        let out = dirichlet_multinomial(&mat, &depths, false, 0.001, &mut rng).unwrap();
        assert!(out.row_mask.iter().all(|&keep| keep));
        for (i, row) in out.counts.row_iter().enumerate() {
            assert_eq!(row.sum(), depths[(i, 0)]);
        }
    }

    #[test]
    fn test_dirichlet_rows_match_depth() {
        let mat = counts();
        let depths = DMatrix::from_column_slice(3, 1, &[1000.0, 250.0, 4000.0]);
        let mut rng = StdRng::seed_from_u64(9);

        let out = dirichlet_multinomial(&mat, &depths, true, 1.0, &mut rng).unwrap();
        for (i, row) in out.counts.row_iter().enumerate() {
            assert_eq!(row.sum(), depths[(i, 0)]);
        }
    }

    #[test]
    fn test_dirichlet_draw_single_component() {
        let mut rng = StdRng::seed_from_u64(10);
        assert_eq!(dirichlet_draw(&[1.0], &mut rng).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_empty_row_error() {
        let mut mat = counts();
        mat.row_mut(1).fill(0.0);
        let depths = DMatrix::from_element(3, 1, 10.0);
        let mut rng = StdRng::seed_from_u64(12);
        assert!(matches!(
            dirichlet_multinomial(&mat, &depths, false, 0.0, &mut rng),
            Err(SimError::EmptyRow(1))
        ));
    }
}
