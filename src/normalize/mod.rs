//! Compositional primitives.
//!
//! - **closure**: row-wise simplex closure and multiplicative zero replacement
//! - **alr**: additive log-ratio transform and its inverse

pub mod alr;
pub mod closure;

pub use alr::{alr, alr_inv};
pub use closure::{closure, multiplicative_replacement};
