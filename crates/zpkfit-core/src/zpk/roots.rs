//! Root set abstraction
//!
//! Provides a categorized view of the roots of a real rational function
//! (real roots vs complex conjugate pairs) so callers never have to pair up
//! conjugates by hand.

use num_complex::Complex64;

use crate::constants::REAL_ROOT_TOLERANCE;

/// A categorized set of roots of a real polynomial
///
/// Complex roots are stored with positive imaginary parts only (the
/// conjugate is implicit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootSet {
    real: Vec<f64>,
    complex: Vec<Complex64>,
}

/// True if a root is real to within the relative tolerance
#[inline]
pub fn is_real_root(root: Complex64) -> bool {
    root.im.abs() <= REAL_ROOT_TOLERANCE * root.norm()
}

impl RootSet {
    /// Build from a full-plane list containing explicit conjugate pairs
    ///
    /// Roots with negligible imaginary part become real roots. Of each
    /// conjugate pair only the upper-half-plane member is kept, so the input
    /// is expected to be conjugate symmetric.
    pub fn from_fullplane(roots: &[Complex64]) -> Self {
        let mut real = Vec::new();
        let mut complex = Vec::new();

        for &root in roots {
            if is_real_root(root) {
                real.push(root.re);
            } else if root.im > 0.0 {
                complex.push(root);
            }
        }

        Self { real, complex }
    }

    /// Create from separate real and upper-half-plane complex roots
    pub fn from_parts(real: Vec<f64>, complex: Vec<Complex64>) -> Self {
        let complex = complex
            .into_iter()
            .map(|c| if c.im < 0.0 { c.conj() } else { c })
            .collect();
        Self { real, complex }
    }

    #[inline]
    pub fn n_real(&self) -> usize {
        self.real.len()
    }

    /// Number of complex conjugate pairs
    #[inline]
    pub fn n_complex(&self) -> usize {
        self.complex.len()
    }

    /// Number of roots counting both members of each pair
    #[inline]
    pub fn order(&self) -> usize {
        self.real.len() + 2 * self.complex.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.real.is_empty() && self.complex.is_empty()
    }

    #[inline]
    pub fn real(&self) -> &[f64] {
        &self.real
    }

    /// Complex roots (positive imaginary only)
    #[inline]
    pub fn complex(&self) -> &[Complex64] {
        &self.complex
    }

    /// Full-plane list: real roots, then each complex root followed by its conjugate
    pub fn fullplane(&self) -> Vec<Complex64> {
        let mut roots = Vec::with_capacity(self.order());
        roots.extend(self.real.iter().map(|&r| Complex64::new(r, 0.0)));
        for &c in &self.complex {
            roots.push(c);
            roots.push(c.conj());
        }
        roots
    }
}
