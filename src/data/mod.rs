//! Labeled count tables.

mod count_matrix;

pub use count_matrix::CountMatrix;
