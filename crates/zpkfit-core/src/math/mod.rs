//! Mathematical helpers module
//!
//! Linear algebra used by the AAA kernel and the local optimizer.

pub mod linalg;

pub use linalg::{eigenvalues, lstsq, min_right_singular_vector};
