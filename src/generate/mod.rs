//! Synthetic latent-abundance generators.
//!
//! These produce positive abundance matrices (samples × features) meant as
//! input for the count samplers in [`crate::model`].

mod blocks;
mod gradient;

pub use blocks::{blocks, BlockConfig};
pub use gradient::gradient;

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
