//! AAA (Adaptive Antoulas-Anderson) rational approximation
//!
//! Builds real-rational barycentric approximants of sampled frequency
//! responses and exposes their zeros, poles and gain per truncation degree.
//!
//! # References
//!
//! - Y. Nakatsukasa, O. Sete, L. N. Trefethen, "The AAA Algorithm for Rational
//!   Approximation", SIAM J. Sci. Comput., vol. 40, no. 3, 2018
//! - P. Lietaert, K. Meerbergen, J. Pérez, B. Vandereycken, "Automatic Rational
//!   Approximation and Linearization of Nonlinear Eigenvalue Problems",
//!   IMA J. Numer. Anal., 2022

mod barycentric;
mod kernel;
mod tfaaa;

pub use barycentric::Barycentric;
pub use kernel::AaaKernel;
pub use tfaaa::{AaaOptions, TfAaa};
