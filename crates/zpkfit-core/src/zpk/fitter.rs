//! ZPK fitter
//!
//! A `ZpkFitter` binds a coded zero-pole-gain model to shared response data.
//! The optimizer varies the codings that are currently active; everything
//! else stays frozen.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::debug;

use super::coding::{self, CodingId, CodingMap, Factor};
use super::model;
use super::optimize::{self, LeastSquaresProblem, OptimizeOptions, OptimizeReport};
use super::roots::RootSet;
use crate::error::{FitError, Result};
use crate::response::ResponseData;

/// A zero-pole-gain model bound to weighted response data
#[derive(Debug, Clone)]
pub struct ZpkFitter {
    response: Rc<ResponseData>,
    coding_map: CodingMap,
    zeros: Vec<Factor>,
    poles: Vec<Factor>,
    gain: f64,
    /// Codings the optimizer may vary; `None` means all of them
    active: Option<Vec<CodingId>>,
    pub optimize_options: OptimizeOptions,
}

impl ZpkFitter {
    /// Create a fitter holding the constant model `H(s) = 1`
    pub fn new(response: Rc<ResponseData>, coding_map: CodingMap) -> Self {
        Self {
            response,
            coding_map,
            zeros: Vec::new(),
            poles: Vec::new(),
            gain: 1.0,
            active: None,
            optimize_options: OptimizeOptions::default(),
        }
    }

    /// Create a fitter from full-plane zeros and poles
    pub fn from_zpk(
        response: Rc<ResponseData>,
        coding_map: CodingMap,
        zeros: &[Complex64],
        poles: &[Complex64],
        gain: f64,
    ) -> Self {
        Self {
            zeros: coding::encode(&RootSet::from_fullplane(zeros), coding_map),
            poles: coding::encode(&RootSet::from_fullplane(poles), coding_map),
            gain,
            ..Self::new(response, coding_map)
        }
    }

    /// Build a new fitter on the same data bound to new ZPK values
    ///
    /// # Arguments
    /// * `coding_map` - Coding for the new fitter (`None` keeps this fitter's)
    /// * `zeros`, `poles` - Full-plane root lists
    /// * `gain` - Real gain
    /// * `check_sign` - Flip the gain sign if the model anti-correlates with the data
    pub fn regenerate(
        &self,
        coding_map: Option<CodingMap>,
        zeros: &[Complex64],
        poles: &[Complex64],
        gain: f64,
        check_sign: bool,
    ) -> ZpkFitter {
        let mut fitter = Self::from_zpk(
            Rc::clone(&self.response),
            coding_map.unwrap_or(self.coding_map),
            zeros,
            poles,
            gain,
        );
        fitter.optimize_options = self.optimize_options.clone();

        if check_sign {
            let shape = fitter.shape();
            let k = model::real_ls_gain(
                &shape.to_vec(),
                &self.response.data().to_vec(),
                &self.response.weights().to_vec(),
            );
            if k * fitter.gain < 0.0 {
                debug!(gain = fitter.gain, "flipping gain sign to match data");
                fitter.gain = -fitter.gain;
            }
        }
        fitter
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Shared handle to the response data
    #[inline]
    pub fn response_handle(&self) -> Rc<ResponseData> {
        Rc::clone(&self.response)
    }

    #[inline]
    pub fn f_hz(&self) -> &Array1<f64> {
        self.response.f_hz()
    }

    #[inline]
    pub fn data(&self) -> &Array1<Complex64> {
        self.response.data()
    }

    #[inline]
    pub fn weights(&self) -> &Array1<f64> {
        self.response.weights()
    }

    #[inline]
    pub fn coding_map(&self) -> CodingMap {
        self.coding_map
    }

    pub fn zeros(&self) -> RootSet {
        coding::decode(&self.zeros)
    }

    pub fn poles(&self) -> RootSet {
        coding::decode(&self.poles)
    }

    #[inline]
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Pole count minus zero count
    pub fn relative_degree(&self) -> i64 {
        self.poles().order() as i64 - self.zeros().order() as i64
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Model response at the given frequencies (Hz)
    pub fn response_at(&self, freqs: &[f64]) -> Array1<Complex64> {
        Array1::from_iter(freqs.iter().map(|&f| {
            let s = Complex64::new(0.0, f);
            model::factored_shape(&self.zeros, &self.poles, s) * self.gain
        }))
    }

    /// Model response at the data frequencies
    pub fn response(&self) -> Array1<Complex64> {
        self.shape().mapv(|h| h * self.gain)
    }

    fn shape(&self) -> Array1<Complex64> {
        self.response.f_hz().mapv(|f| {
            model::factored_shape(&self.zeros, &self.poles, Complex64::new(0.0, f))
        })
    }

    /// Weighted RMS residual of the model against the data
    pub fn residual_rms(&self) -> f64 {
        self.response.weighted_rms(&self.response())
    }

    // ------------------------------------------------------------------------
    // Codings
    // ------------------------------------------------------------------------

    /// Coding id of the gain
    #[inline]
    pub fn gain_coding(&self) -> CodingId {
        CodingId::Gain
    }

    /// All coding ids, zeros first, then poles, then the gain
    pub fn codings(&self) -> Vec<CodingId> {
        (0..self.zeros.len())
            .map(CodingId::Zero)
            .chain((0..self.poles.len()).map(CodingId::Pole))
            .chain(std::iter::once(CodingId::Gain))
            .collect()
    }

    /// Codings the optimizer currently varies
    pub fn active_codings(&self) -> Vec<CodingId> {
        match &self.active {
            Some(active) => active.clone(),
            None => self.codings(),
        }
    }

    /// Restrict the optimizer to `codings` for the lifetime of the guard
    ///
    /// The previous coding set is restored when the guard drops, on every
    /// exit path.
    pub fn with_codings_only(&mut self, codings: &[CodingId]) -> Result<CodingScope<'_>> {
        let known = self.codings();
        if let Some(unknown) = codings.iter().find(|c| !known.contains(c)) {
            return Err(FitError::UnknownCoding(*unknown));
        }
        let previous = self.active.replace(codings.to_vec());
        Ok(CodingScope {
            fitter: self,
            previous,
        })
    }

    // ------------------------------------------------------------------------
    // Optimization
    // ------------------------------------------------------------------------

    /// Refine the active codings against the weighted data
    pub fn optimize(&mut self) -> Result<OptimizeReport> {
        let active = self.active_param_indices();
        let options = self.optimize_options.clone();
        let mut problem = ActiveProblem {
            fitter: self,
            active,
        };
        let report = optimize::levenberg_marquardt(&mut problem, &options)?;
        debug!(
            initial_cost = report.initial_cost,
            final_cost = report.final_cost,
            iterations = report.iterations,
            converged = report.converged,
            "ZPK optimize"
        );
        Ok(report)
    }

    /// Flat parameter vector: zero factors, pole factors, gain
    fn param_vector(&self) -> Vec<f64> {
        let mut params = Vec::new();
        for factor in self.zeros.iter().chain(self.poles.iter()) {
            factor.write_params(&mut params);
        }
        params.push(self.gain);
        params
    }

    fn set_param_vector(&mut self, params: &[f64]) {
        let mut offset = 0;
        for factor in self.zeros.iter_mut().chain(self.poles.iter_mut()) {
            factor.read_params(&params[offset..]);
            offset += factor.n_params();
        }
        self.gain = params[offset];
    }

    /// Indices into the flat parameter vector for the active codings
    fn active_param_indices(&self) -> Vec<usize> {
        let active = self.active_codings();
        let mut indices = Vec::new();
        let mut offset = 0;

        let factors = self
            .zeros
            .iter()
            .enumerate()
            .map(|(i, f)| (CodingId::Zero(i), f))
            .chain(
                self.poles
                    .iter()
                    .enumerate()
                    .map(|(i, f)| (CodingId::Pole(i), f)),
            );
        for (id, factor) in factors {
            if active.contains(&id) {
                indices.extend(offset..offset + factor.n_params());
            }
            offset += factor.n_params();
        }
        if active.contains(&CodingId::Gain) {
            indices.push(offset);
        }
        indices
    }

    /// Weighted residuals stacked as [real parts; imaginary parts]
    fn stacked_residuals(&self) -> Array1<f64> {
        let n = self.response.len();
        let mut r = Array1::<f64>::zeros(2 * n);
        let model = self.response();
        for (i, ((h, d), w)) in model
            .iter()
            .zip(self.response.data().iter())
            .zip(self.response.weights().iter())
            .enumerate()
        {
            let e = (h - d) * *w;
            r[i] = e.re;
            r[n + i] = e.im;
        }
        r
    }

    /// Full Jacobian of the stacked residuals, `[2 * n_samples, n_params]`
    fn full_jacobian(&self) -> Array2<f64> {
        let n = self.response.len();
        let n_params = self.param_vector().len();
        let mut jac = Array2::<f64>::zeros((2 * n, n_params));

        for (i, (&f, &w)) in self
            .response
            .f_hz()
            .iter()
            .zip(self.response.weights().iter())
            .enumerate()
        {
            let s = Complex64::new(0.0, f);
            let shape = model::factored_shape(&self.zeros, &self.poles, s);
            let h = shape * self.gain;
            let mut col = 0;

            for (factor, sign) in self
                .zeros
                .iter()
                .map(|z| (z, 1.0))
                .chain(self.poles.iter().map(|p| (p, -1.0)))
            {
                let q = factor.eval(s);
                let grad = factor.grad(s);
                for g in grad.iter().take(factor.n_params()) {
                    let d = h * *g / q * (sign * w);
                    jac[[i, col]] = d.re;
                    jac[[n + i, col]] = d.im;
                    col += 1;
                }
            }

            let d = shape * w;
            jac[[i, col]] = d.re;
            jac[[n + i, col]] = d.im;
        }
        jac
    }
}

/// Scoped coding restriction on a fitter
///
/// Dereferences to the fitter; restores the previous coding set on drop.
pub struct CodingScope<'a> {
    fitter: &'a mut ZpkFitter,
    previous: Option<Vec<CodingId>>,
}

impl Deref for CodingScope<'_> {
    type Target = ZpkFitter;

    fn deref(&self) -> &ZpkFitter {
        &*self.fitter
    }
}

impl DerefMut for CodingScope<'_> {
    fn deref_mut(&mut self) -> &mut ZpkFitter {
        &mut *self.fitter
    }
}

impl Drop for CodingScope<'_> {
    fn drop(&mut self) {
        self.fitter.active = self.previous.take();
    }
}

/// The active-coding subproblem of a fitter
struct ActiveProblem<'a> {
    fitter: &'a mut ZpkFitter,
    active: Vec<usize>,
}

impl LeastSquaresProblem for ActiveProblem<'_> {
    fn params(&self) -> Array1<f64> {
        let all = self.fitter.param_vector();
        Array1::from_iter(self.active.iter().map(|&i| all[i]))
    }

    fn set_params(&mut self, x: &Array1<f64>) {
        let mut all = self.fitter.param_vector();
        for (&i, &v) in self.active.iter().zip(x.iter()) {
            all[i] = v;
        }
        self.fitter.set_param_vector(&all);
    }

    fn residuals(&self) -> Array1<f64> {
        self.fitter.stacked_residuals()
    }

    fn jacobian(&self) -> Array2<f64> {
        let full = self.fitter.full_jacobian();
        full.select(ndarray::Axis(1), &self.active)
    }
}
