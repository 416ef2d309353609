//! Real-rational barycentric form
//!
//! Support points come in conjugate pairs `(i f_k, -i f_k)` carrying values
//! `(F_k, conj F_k)` and weights `(w_k, conj w_k)`:
//!
//! ```text
//! N(s) = sum_k [ w_k F_k / (s - i f_k) + conj(w_k F_k) / (s + i f_k) ]
//! D(s) = sum_k [ w_k     / (s - i f_k) + conj(w_k)     / (s + i f_k) ]
//! r(s) = N(s) / D(s)
//! ```
//!
//! so `r` is a real rational function of type `(2m - 1, 2m - 1)` that
//! interpolates the data at every support point.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::math::eigenvalues;
use crate::zpk::RootSet;

/// A conjugate-paired barycentric rational function
#[derive(Debug, Clone, Default)]
pub struct Barycentric {
    support_f: Vec<f64>,
    values: Vec<Complex64>,
    weights: Vec<Complex64>,
}

impl Barycentric {
    pub fn new(support_f: Vec<f64>, values: Vec<Complex64>, weights: Vec<Complex64>) -> Self {
        debug_assert_eq!(support_f.len(), values.len());
        debug_assert_eq!(support_f.len(), weights.len());
        Self {
            support_f,
            values,
            weights,
        }
    }

    /// Number of support pairs
    #[inline]
    pub fn len(&self) -> usize {
        self.support_f.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.support_f.is_empty()
    }

    /// Support frequencies (Hz), in greedy selection order
    #[inline]
    pub fn support_f(&self) -> &[f64] {
        &self.support_f
    }

    /// Data values at the support frequencies
    #[inline]
    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Barycentric weights, one per support pair
    #[inline]
    pub fn weights(&self) -> &[Complex64] {
        &self.weights
    }

    /// Nominal degree `2m - 1`; zero when empty
    pub fn degree(&self) -> usize {
        (2 * self.len()).saturating_sub(1)
    }

    /// Evaluate at a point of the Laplace plane (Hz units)
    ///
    /// Returns the support value exactly at a support point, and zero for an
    /// empty model.
    pub fn eval(&self, s: Complex64) -> Complex64 {
        let mut num = Complex64::new(0.0, 0.0);
        let mut den = Complex64::new(0.0, 0.0);

        for ((&f, &value), &w) in self
            .support_f
            .iter()
            .zip(self.values.iter())
            .zip(self.weights.iter())
        {
            let node = Complex64::new(0.0, f);
            let d_upper = s - node;
            let d_lower = s - node.conj();
            if d_upper.norm_sqr() == 0.0 {
                return value;
            }
            if d_lower.norm_sqr() == 0.0 {
                return value.conj();
            }
            let wv = w * value;
            num += wv / d_upper + wv.conj() / d_lower;
            den += w / d_upper + w.conj() / d_lower;
        }

        if self.is_empty() {
            return Complex64::new(0.0, 0.0);
        }
        num / den
    }

    /// Evaluate on the imaginary axis at frequency `f` (Hz)
    #[inline]
    pub fn eval_f(&self, f: f64) -> Complex64 {
        self.eval(Complex64::new(0.0, f))
    }

    /// Finite poles (full plane), roots of the denominator
    ///
    /// See [`paired_roots`] for `sigma` and `cutoff`.
    pub fn poles(&self, sigma: f64, cutoff: f64) -> Result<Vec<Complex64>, &'static str> {
        paired_roots(&self.support_f, &self.weights, sigma, cutoff)
    }

    /// Finite zeros (full plane), roots of the numerator
    pub fn zeros(&self, sigma: f64, cutoff: f64) -> Result<Vec<Complex64>, &'static str> {
        let coeffs: Vec<Complex64> = self
            .weights
            .iter()
            .zip(self.values.iter())
            .map(|(w, v)| w * v)
            .collect();
        paired_roots(&self.support_f, &coeffs, sigma, cutoff)
    }
}

/// Roots of `q(s) = sum_k [ c_k / (s - i f_k) + conj(c_k) / (s + i f_k) ]`
///
/// The substitution `x = 1 / (s - sigma)` moves roots at infinity to `x = 0`
/// and turns `q` into `-x * q~(x)` with nodes `tau_k = 1 / (i f_k - sigma)`
/// and coefficients `c_k tau_k`. The roots of `q~` (plus one extra root at
/// zero) are the eigenvalues of the real matrix `A - u v^T A / (v^T u)`,
/// where `A` is block diagonal with one `[[re, im], [-im, re]]` block per
/// node pair. `sigma` must be real and not a root; roots with modulus above
/// `cutoff` are treated as roots at infinity.
pub fn paired_roots(
    support_f: &[f64],
    coeffs: &[Complex64],
    sigma: f64,
    cutoff: f64,
) -> Result<Vec<Complex64>, &'static str> {
    let m = support_f.len();
    if m == 0 {
        return Ok(Vec::new());
    }
    if coeffs.len() != m {
        return Err("Dimension mismatch");
    }

    let n = 2 * m;
    let mut a = Array2::<f64>::zeros((n, n));
    let mut u = Array1::<f64>::zeros(n);
    let mut v = Array1::<f64>::zeros(n);

    for (k, (&f, &c)) in support_f.iter().zip(coeffs.iter()).enumerate() {
        let tau = Complex64::new(1.0, 0.0) / Complex64::new(-sigma, f);
        let ct = c * tau;
        let (i_re, i_im) = (2 * k, 2 * k + 1);

        a[[i_re, i_re]] = tau.re;
        a[[i_re, i_im]] = tau.im;
        a[[i_im, i_re]] = -tau.im;
        a[[i_im, i_im]] = tau.re;

        u[i_re] = 2.0;
        v[i_re] = ct.re;
        v[i_im] = ct.im;
    }

    let g = v.dot(&u);
    if !g.is_finite() || g == 0.0 {
        return Err("Degenerate barycentric coefficients");
    }

    // M = A - u (v^T A) / g
    let va = a.t().dot(&v);
    let mut mat = a;
    for i in 0..n {
        for j in 0..n {
            mat[[i, j]] -= u[i] * va[j] / g;
        }
    }

    let mut eigs = eigenvalues(&mat)?;

    // Drop the extra eigenvalue at x = 0
    if let Some(idx) = eigs
        .iter()
        .enumerate()
        .min_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
        .map(|(i, _)| i)
    {
        eigs.remove(idx);
    }

    let roots: Vec<Complex64> = eigs
        .iter()
        .filter(|x| x.norm() > 0.0)
        .map(|x| Complex64::new(sigma, 0.0) + Complex64::new(1.0, 0.0) / x)
        .filter(|s| s.re.is_finite() && s.im.is_finite() && s.norm() <= cutoff)
        .collect();

    Ok(RootSet::from_fullplane(&roots).fullplane())
}
