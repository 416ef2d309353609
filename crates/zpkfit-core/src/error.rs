//! Error types for ZPK fitting

use num_complex::Complex64;
use thiserror::Error;

/// Errors raised while fitting a ZPK model
#[derive(Error, Debug)]
pub enum FitError {
    #[error("Invalid response data: {0}")]
    InvalidData(String),

    #[error("Hint '{name}' has an unexpected type: expected {expected}")]
    HintType { name: String, expected: &'static str },

    #[error("Invalid hint layer: {0}")]
    HintLayer(#[from] serde_json::Error),

    #[error("Linear algebra failure in {context}: {message}")]
    Linalg {
        context: &'static str,
        message: &'static str,
    },

    #[error("Unknown coding {0:?} for this fitter")]
    UnknownCoding(crate::zpk::CodingId),

    /// Stabilization left poles outside the open left half-plane.
    #[error("Stabilized model still has {} unstable pole(s): {}", .poles.len(), format_roots(.poles))]
    UnstablePoles { poles: Vec<Complex64> },
}

impl FitError {
    pub(crate) fn linalg(context: &'static str) -> impl FnOnce(&'static str) -> Self {
        move |message| FitError::Linalg { context, message }
    }
}

fn format_roots(roots: &[Complex64]) -> String {
    roots
        .iter()
        .map(|r| format!("{:.6e}{:+.6e}j", r.re, r.im))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, FitError>;
