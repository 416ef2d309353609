//! Model response evaluation
//!
//! Functions for evaluating zero-pole-gain models at given frequencies.

use ndarray::Array1;
use num_complex::Complex64;

use super::coding::Factor;

/// Evaluate a ZPK model given as full-plane root lists
///
/// Computes: H(s) = k * prod(s - z) / prod(s - p) at `s = i * f`.
pub fn evaluate_zpk(
    zeros: &[Complex64],
    poles: &[Complex64],
    gain: f64,
    freqs: &[f64],
) -> Array1<Complex64> {
    Array1::from_iter(freqs.iter().map(|&f| {
        let s = Complex64::new(0.0, f);
        let num = zeros
            .iter()
            .fold(Complex64::new(gain, 0.0), |acc, z| acc * (s - z));
        poles.iter().fold(num, |acc, p| acc / (s - p))
    }))
}

/// Shape of a factored model (gain excluded) at a single point
#[inline]
pub fn factored_shape(zeros: &[Factor], poles: &[Factor], s: Complex64) -> Complex64 {
    let num = zeros
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, z| acc * z.eval(s));
    poles.iter().fold(num, |acc, p| acc / p.eval(s))
}

/// Real gain minimizing the weighted error `sum w^2 |data - k * shape|^2`
///
/// Returns 0 when the shape vanishes at every weighted sample.
pub fn real_ls_gain(shape: &[Complex64], data: &[Complex64], weights: &[f64]) -> f64 {
    let (num, den) = shape
        .iter()
        .zip(data.iter())
        .zip(weights.iter())
        .fold((0.0, 0.0), |(num, den), ((h, d), w)| {
            let w2 = w * w;
            (num + w2 * (h.conj() * d).re, den + w2 * h.norm_sqr())
        });
    if den > 0.0 && den.is_finite() {
        num / den
    } else {
        0.0
    }
}
