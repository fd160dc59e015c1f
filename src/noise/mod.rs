//! Noise and missingness applied to compositions before resampling.

mod inject;

pub use inject::{add_noise, NoiseConfig};
