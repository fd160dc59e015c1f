//! Noise injection in additive log-ratio space.
//!
//! Counts are shifted by a pseudocount and mapped into ALR coordinates, where
//! they are approximately normal. Gaussian noise is added there, the result is
//! mapped back to proportions and missing values are imposed last.

use crate::error::{Result, SimError};
use crate::normalize::alr::{alr, alr_inv};
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Parameters for [`add_noise`].
///
/// Percentages are fractions (0.1 = 10%). Ranges are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Standard deviation of the homoscedastic noise applied to every coordinate.
    pub percent_normal: f64,
    /// Fraction of coordinates given heteroscedastic noise; also the base
    /// standard deviation of that second pass.
    pub percent_random: f64,
    /// Standard deviation used for the selected heteroscedastic coordinates.
    pub random_count: f64,
    /// Zero out random coordinates instead of the input's zero pattern.
    pub add_missing_at_random: bool,
    /// Fraction of coordinates zeroed when `add_missing_at_random` is set.
    pub percent_missing: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            percent_normal: 0.1,
            percent_random: 0.1,
            random_count: 1.0,
            add_missing_at_random: false,
            percent_missing: 0.1,
        }
    }
}

impl NoiseConfig {
    /// No noise and no extra missingness; only the input's zeros are kept.
    pub fn none() -> Self {
        Self {
            percent_normal: 0.0,
            percent_random: 0.0,
            ..Default::default()
        }
    }

    /// Set homoscedastic noise level.
    pub fn with_normal(mut self, percent_normal: f64) -> Self {
        self.percent_normal = percent_normal;
        self
    }

    /// Set heteroscedastic noise fraction and intensity.
    pub fn with_random(mut self, percent_random: f64, random_count: f64) -> Self {
        self.percent_random = percent_random;
        self.random_count = random_count;
        self
    }

    /// Zero out a random fraction of entries.
    pub fn with_missing_at_random(mut self, percent_missing: f64) -> Self {
        self.add_missing_at_random = true;
        self.percent_missing = percent_missing;
        self
    }

    /// Keep exactly the zero pattern of the input.
    pub fn with_input_sparsity(mut self) -> Self {
        self.add_missing_at_random = false;
        self
    }
}

/// Perturb a composition matrix and return noisy proportions.
///
/// # Arguments
/// * `mat` - Counts or proportions (samples × features), at least 2 features
/// * `pseudocount` - Added to every entry before the ALR transform
/// * `config` - Noise levels and missingness policy
/// * `rng` - Random source
///
/// # Returns
/// A samples × features matrix of proportions. Rows sum to one except where
/// entries were zeroed by the missingness step.
pub fn add_noise<R: Rng + ?Sized>(
    mat: &DMatrix<f64>,
    pseudocount: f64,
    config: &NoiseConfig,
    rng: &mut R,
) -> Result<DMatrix<f64>> {
    let mut coords = alr(&mat.add_scalar(pseudocount))?;
    let (n_rows, n_coords) = coords.shape();

    log::debug!(
        "adding noise to {} x {} ALR coordinates: normal = {}, random = {} (x{}), missing at random = {}",
        n_rows,
        n_coords,
        config.percent_normal,
        config.percent_random,
        config.random_count,
        config.add_missing_at_random
    );

    // Homoscedastic noise
    let normal = gaussian(config.percent_normal)?;
    coords.apply(|v| *v += normal.sample(rng));

    // Heteroscedastic noise
    let mut scale = DMatrix::from_element(n_rows, n_coords, config.percent_random);
    let n_entries = fraction_of(config.percent_random, count_nonzero(&coords));
    for (i, j) in distinct_cells(n_rows, n_coords, n_entries, rng) {
        scale[(i, j)] = config.random_count;
    }
    for j in 0..n_coords {
        for i in 0..n_rows {
            coords[(i, j)] += gaussian(scale[(i, j)])?.sample(rng);
        }
    }

    let mut noisy = alr_inv(&coords)?;

    if config.add_missing_at_random {
        let n_missing = fraction_of(config.percent_missing, count_nonzero(&noisy));
        let (rows, cols) = noisy.shape();
        for (i, j) in distinct_cells(rows, cols, n_missing, rng) {
            noisy[(i, j)] = 0.0;
        }
    } else {
        noisy.zip_apply(mat, |v, original| {
            if original == 0.0 {
                *v = 0.0;
            }
        });
    }

    Ok(noisy)
}

/// Zero-mean normal; `std_dev` must be non-negative and finite.
fn gaussian(std_dev: f64) -> Result<Normal<f64>> {
    if !(std_dev >= 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "noise standard deviation must be non-negative, got {}",
            std_dev
        )));
    }
    Normal::new(0.0, std_dev).map_err(|e| {
        SimError::InvalidParameter(format!("noise standard deviation {}: {}", std_dev, e))
    })
}

fn count_nonzero(mat: &DMatrix<f64>) -> usize {
    mat.iter().filter(|&&v| v != 0.0).count()
}

/// `floor(fraction * n)`; negative or NaN fractions select nothing.
fn fraction_of(fraction: f64, n: usize) -> usize {
    (fraction * n as f64).floor() as usize
}

/// Pick `amount` distinct (row, col) cells, capped at the number of cells.
fn distinct_cells<R: Rng + ?Sized>(
    n_rows: usize,
    n_cols: usize,
    amount: usize,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let n_cells = n_rows * n_cols;
    if n_cells == 0 || amount == 0 {
        return Vec::new();
    }
    rand::seq::index::sample(rng, n_cells, amount.min(n_cells))
        .into_iter()
        .map(|cell| (cell / n_cols, cell % n_cols))
        .collect()
}
