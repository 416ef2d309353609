//! Greedy real-rational AAA fit
//!
//! Each step adds the sample with the largest weighted residual as a new
//! conjugate support pair and re-solves the weighted Loewner least squares
//! problem for the barycentric weights. Every step is recorded, so any
//! earlier truncation can be selected afterwards without another solve.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use super::barycentric::Barycentric;
use super::kernel::AaaKernel;
use crate::constants::{AAA_RES_TOLERANCE, AAA_ROOT_CUTOFF, DEFAULT_ORDER};
use crate::error::{FitError, Result};
use crate::math::min_right_singular_vector;
use crate::response::ResponseData;
use crate::zpk::model::{evaluate_zpk, real_ls_gain};

/// Tuning of the AAA fit
#[derive(Debug, Clone)]
pub struct AaaOptions {
    /// Largest nominal pole count of any truncation
    pub degree_max: usize,
    /// Stop once the weighted max residual is below `res_tol * max(W |F|)`
    pub res_tol: f64,
    /// Roots beyond `root_cutoff * f_max` are treated as roots at infinity
    pub root_cutoff: f64,
}

impl Default for AaaOptions {
    fn default() -> Self {
        Self {
            degree_max: DEFAULT_ORDER,
            res_tol: AAA_RES_TOLERANCE,
            root_cutoff: AAA_ROOT_CUTOFF,
        }
    }
}

impl AaaOptions {
    pub fn with_degree_max(degree_max: usize) -> Self {
        Self {
            degree_max,
            ..Default::default()
        }
    }
}

/// One recorded step of the greedy sequence
#[derive(Debug, Clone)]
struct Truncation {
    model: Barycentric,
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
    res_rms: f64,
}

/// AAA model of a frequency response with selectable truncation
#[derive(Debug, Clone)]
pub struct TfAaa {
    /// Step 0 is the constant model; step `m` has `m` support pairs
    steps: Vec<Truncation>,
    active: usize,
}

impl TfAaa {
    /// Run the greedy AAA iteration on weighted response data
    pub fn fit(response: &ResponseData, options: &AaaOptions) -> Result<Self> {
        let f = response.f_hz();
        let data = response.data();
        let weights = response.weights();
        let n = response.len();

        let f_max = response.f_max();
        let sigma = if f_max > 0.0 { f_max } else { 1.0 };
        let cutoff = options.root_cutoff * sigma;
        let scale = data
            .iter()
            .zip(weights.iter())
            .map(|(d, w)| w * d.norm())
            .fold(0.0, f64::max);

        let f_slice = f.to_vec();
        let data_slice = data.to_vec();
        let weight_slice = weights.to_vec();

        // Constant model
        let ones = vec![Complex64::new(1.0, 0.0); n];
        let gain0 = real_ls_gain(&ones, &data_slice, &weight_slice);
        let mut approx = vec![Complex64::new(gain0, 0.0); n];
        let mut steps = vec![Truncation {
            model: Barycentric::default(),
            zeros: Vec::new(),
            poles: Vec::new(),
            gain: gain0,
            res_rms: response.weighted_rms(&ndarray::Array1::from_vec(approx.clone())),
        }];

        let mut support: Vec<usize> = Vec::new();

        loop {
            let errors: Vec<f64> = (0..n)
                .map(|i| {
                    let e = weights[i] * (data[i] - approx[i]).norm();
                    if e.is_finite() {
                        e
                    } else {
                        f64::INFINITY
                    }
                })
                .collect();
            let max_err = errors.iter().cloned().fold(0.0, f64::max);

            if max_err <= options.res_tol * scale {
                debug!(support = support.len(), max_err, "AAA converged");
                break;
            }
            if 2 * (support.len() + 1) - 1 > options.degree_max {
                break;
            }

            let is_support_freq = |i: usize| support.iter().any(|&k| f[k] == f[i]);
            let next = (0..n)
                .filter(|&i| f[i] > 0.0 && !is_support_freq(i))
                .max_by(|&a, &b| errors[a].total_cmp(&errors[b]));
            let Some(j) = next else {
                break;
            };
            support.push(j);

            let weights_bary = Self::solve_weights(response, &support)?;
            let model = Barycentric::new(
                support.iter().map(|&k| f[k]).collect(),
                support.iter().map(|&k| data[k]).collect(),
                weights_bary,
            );

            approx = f.iter().map(|&fi| model.eval_f(fi)).collect();
            let res_rms = response.weighted_rms(&ndarray::Array1::from_vec(approx.clone()));

            let zeros = model
                .zeros(sigma, cutoff)
                .map_err(FitError::linalg("AAA zeros"))?;
            let poles = model
                .poles(sigma, cutoff)
                .map_err(FitError::linalg("AAA poles"))?;
            let shape = evaluate_zpk(&zeros, &poles, 1.0, &f_slice);
            let gain = real_ls_gain(&shape.to_vec(), &data_slice, &weight_slice);

            debug!(
                support = support.len(),
                order = poles.len(),
                n_zeros = zeros.len(),
                res_rms,
                "AAA step"
            );

            steps.push(Truncation {
                model,
                zeros,
                poles,
                gain,
                res_rms,
            });
        }

        let active = steps.len() - 1;
        Ok(Self { steps, active })
    }

    /// Weighted Loewner least squares for the barycentric weights
    ///
    /// Unknowns are the real and imaginary parts of one weight per support
    /// pair; rows are the real and imaginary parts of the linearized
    /// residual `W_i (F_i D(s_i) - N(s_i))` at every non-support sample.
    fn solve_weights(response: &ResponseData, support: &[usize]) -> Result<Vec<Complex64>> {
        let f = response.f_hz();
        let data = response.data();
        let weights = response.weights();

        let rows: Vec<usize> = (0..response.len())
            .filter(|&i| support.iter().all(|&k| f[k] != f[i]))
            .collect();
        let n_rows = rows.len();
        let m = support.len();

        let mut loewner = Array2::<f64>::zeros((2 * n_rows, 2 * m));
        for (r, &i) in rows.iter().enumerate() {
            let s_i = Complex64::new(0.0, f[i]);
            for (k, &j) in support.iter().enumerate() {
                let s_j = Complex64::new(0.0, f[j]);
                let c_upper = (data[i] - data[j]) / (s_i - s_j);
                let c_lower = (data[i] - data[j].conj()) / (s_i + s_j);
                let col_re = (c_upper + c_lower) * weights[i];
                let col_im = Complex64::i() * (c_upper - c_lower) * weights[i];

                loewner[[r, 2 * k]] = col_re.re;
                loewner[[n_rows + r, 2 * k]] = col_re.im;
                loewner[[r, 2 * k + 1]] = col_im.re;
                loewner[[n_rows + r, 2 * k + 1]] = col_im.im;
            }
        }

        let (v, _) =
            min_right_singular_vector(&loewner).map_err(FitError::linalg("AAA weights"))?;
        Ok((0..m)
            .map(|k| Complex64::new(v[2 * k], v[2 * k + 1]))
            .collect())
    }

    /// Number of recorded truncations, including the constant model
    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }

    /// Barycentric form of the active truncation
    pub fn barycentric(&self) -> &Barycentric {
        &self.steps[self.active].model
    }

    /// Evaluate the active barycentric approximant at frequency `f` (Hz)
    pub fn eval_f(&self, f: f64) -> Complex64 {
        let step = &self.steps[self.active];
        if step.model.is_empty() {
            Complex64::new(step.gain, 0.0)
        } else {
            step.model.eval_f(f)
        }
    }
}

impl AaaKernel for TfAaa {
    fn order(&self) -> usize {
        self.steps[self.active].poles.len()
    }

    fn choose(&mut self, order: usize) {
        self.active = self
            .steps
            .iter()
            .rposition(|step| step.poles.len() <= order)
            .unwrap_or(0);
    }

    fn zeros(&self) -> &[Complex64] {
        &self.steps[self.active].zeros
    }

    fn poles(&self) -> &[Complex64] {
        &self.steps[self.active].poles
    }

    fn gain(&self) -> f64 {
        self.steps[self.active].gain
    }

    fn res_rms(&self) -> f64 {
        self.steps[self.active].res_rms
    }
}
