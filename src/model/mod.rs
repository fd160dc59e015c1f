//! Count-generating distributions for simulating microbiome tables.
//!
//! Every sampler closes its input to proportions, scales them by the
//! per-sample depth, draws each sample independently and drops samples and
//! features whose simulated total is zero.

pub mod dm;
pub mod nb;
pub mod pln;
mod sampling;
pub mod validate;

pub use dm::dirichlet_multinomial;
pub use nb::negative_binomial;
pub use pln::poisson_lognormal;
pub use validate::{validate_input, validate_output, SimOutput};
