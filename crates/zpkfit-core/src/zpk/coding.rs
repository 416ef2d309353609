//! Root codings
//!
//! A coding turns a root set into real factors with real parameters that the
//! optimizer can vary without ever breaking conjugate symmetry.
//!
//! - `CodingMap::Sos` - second-order sections `s^2 + c1 s + c0`, plus one
//!   linear section `s + c0` when the root count is odd
//! - `CodingMap::Ri` - `(s - a)^2 + b^2` per conjugate pair and `s - r` per
//!   real root

use num_complex::Complex64;

use super::roots::RootSet;

/// Parameterization scheme for zeros and poles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodingMap {
    /// Second-order sections
    Sos,
    /// Real / imaginary part of each root
    #[default]
    Ri,
}

/// Identifies one coding of a fitter: the gain or one factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodingId {
    Gain,
    Zero(usize),
    Pole(usize),
}

/// A real polynomial factor of the numerator or denominator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Factor {
    /// `s + c0`
    Linear { c0: f64 },
    /// `s^2 + c1 s + c0`
    Quadratic { c1: f64, c0: f64 },
    /// `s - r`
    Real { r: f64 },
    /// `(s - a)^2 + b^2`, roots `a +/- ib`
    Pair { a: f64, b: f64 },
}

impl Factor {
    /// Number of real parameters
    #[inline]
    pub fn n_params(&self) -> usize {
        match self {
            Factor::Linear { .. } | Factor::Real { .. } => 1,
            Factor::Quadratic { .. } | Factor::Pair { .. } => 2,
        }
    }

    /// Append the parameters to `out`
    pub fn write_params(&self, out: &mut Vec<f64>) {
        match *self {
            Factor::Linear { c0 } => out.push(c0),
            Factor::Quadratic { c1, c0 } => out.extend([c1, c0]),
            Factor::Real { r } => out.push(r),
            Factor::Pair { a, b } => out.extend([a, b]),
        }
    }

    /// Overwrite the parameters from the front of `params`
    pub fn read_params(&mut self, params: &[f64]) {
        match self {
            Factor::Linear { c0 } => *c0 = params[0],
            Factor::Quadratic { c1, c0 } => {
                *c1 = params[0];
                *c0 = params[1];
            }
            Factor::Real { r } => *r = params[0],
            Factor::Pair { a, b } => {
                *a = params[0];
                *b = params[1];
            }
        }
    }

    /// Value of the factor at `s`
    #[inline]
    pub fn eval(&self, s: Complex64) -> Complex64 {
        match *self {
            Factor::Linear { c0 } => s + c0,
            Factor::Quadratic { c1, c0 } => s * s + s * c1 + c0,
            Factor::Real { r } => s - r,
            Factor::Pair { a, b } => {
                let d = s - a;
                d * d + b * b
            }
        }
    }

    /// Partial derivatives of the factor value with respect to each parameter
    pub fn grad(&self, s: Complex64) -> [Complex64; 2] {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        match *self {
            Factor::Linear { .. } => [one, zero],
            Factor::Quadratic { .. } => [s, one],
            Factor::Real { .. } => [-one, zero],
            Factor::Pair { a, b } => [(s - a) * -2.0, Complex64::new(2.0 * b, 0.0)],
        }
    }

    /// Roots of the factor (full plane)
    pub fn roots(&self) -> Vec<Complex64> {
        match *self {
            Factor::Linear { c0 } => vec![Complex64::new(-c0, 0.0)],
            Factor::Real { r } => vec![Complex64::new(r, 0.0)],
            Factor::Pair { a, b } => vec![Complex64::new(a, b), Complex64::new(a, -b)],
            Factor::Quadratic { c1, c0 } => quadratic_roots(c1, c0).to_vec(),
        }
    }
}

/// Roots of `s^2 + c1 s + c0`
///
/// Uses the cancellation-free form for real roots.
fn quadratic_roots(c1: f64, c0: f64) -> [Complex64; 2] {
    let disc = c1 * c1 - 4.0 * c0;
    if disc < 0.0 {
        let re = -0.5 * c1;
        let im = 0.5 * (-disc).sqrt();
        [Complex64::new(re, im), Complex64::new(re, -im)]
    } else {
        let q = -0.5 * (c1 + c1.signum() * disc.sqrt());
        let other = if q != 0.0 { c0 / q } else { 0.0 };
        [Complex64::new(q, 0.0), Complex64::new(other, 0.0)]
    }
}

/// Encode a root set into factors under a coding map
pub fn encode(roots: &RootSet, map: CodingMap) -> Vec<Factor> {
    match map {
        CodingMap::Ri => {
            let mut factors: Vec<Factor> = roots
                .complex()
                .iter()
                .map(|c| Factor::Pair { a: c.re, b: c.im })
                .collect();
            factors.extend(roots.real().iter().map(|&r| Factor::Real { r }));
            factors
        }
        CodingMap::Sos => {
            let mut factors: Vec<Factor> = roots
                .complex()
                .iter()
                .map(|c| Factor::Quadratic {
                    c1: -2.0 * c.re,
                    c0: c.norm_sqr(),
                })
                .collect();

            // Pair neighbouring real roots into sections
            let mut real = roots.real().to_vec();
            real.sort_by(|a, b| a.total_cmp(b));
            let mut chunks = real.chunks_exact(2);
            for pair in &mut chunks {
                factors.push(Factor::Quadratic {
                    c1: -(pair[0] + pair[1]),
                    c0: pair[0] * pair[1],
                });
            }
            if let [r] = chunks.remainder() {
                factors.push(Factor::Linear { c0: -r });
            }
            factors
        }
    }
}

/// Decode factors back into a root set
pub fn decode(factors: &[Factor]) -> RootSet {
    let roots: Vec<Complex64> = factors.iter().flat_map(|f| f.roots()).collect();
    RootSet::from_fullplane(&roots)
}
