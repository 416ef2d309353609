//! Frequency response samples
//!
//! Holds the frequency axis, complex response values and fitting weights
//! that every fitter in a session refers to.

use ndarray::Array1;
use num_complex::Complex64;

use crate::error::{FitError, Result};

/// Weighted frequency response data
#[derive(Debug, Clone)]
pub struct ResponseData {
    /// Frequencies in Hz, non-decreasing
    f_hz: Array1<f64>,
    /// Complex response at each frequency
    data: Array1<Complex64>,
    /// Non-negative fitting weight at each frequency
    weights: Array1<f64>,
}

impl ResponseData {
    /// Create validated response data
    ///
    /// # Errors
    /// `FitError::InvalidData` if lengths differ, the data is empty, any value
    /// is non-finite, frequencies decrease, a weight is negative or all
    /// weights are zero.
    pub fn new(f_hz: Vec<f64>, data: Vec<Complex64>, weights: Vec<f64>) -> Result<Self> {
        if f_hz.is_empty() {
            return Err(FitError::InvalidData("no frequency samples".into()));
        }
        if f_hz.len() != data.len() || f_hz.len() != weights.len() {
            return Err(FitError::InvalidData(format!(
                "length mismatch: {} frequencies, {} values, {} weights",
                f_hz.len(),
                data.len(),
                weights.len()
            )));
        }
        if f_hz.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(FitError::InvalidData(
                "frequencies must be finite and non-negative".into(),
            ));
        }
        if f_hz.windows(2).any(|w| w[1] < w[0]) {
            return Err(FitError::InvalidData("frequencies must be ascending".into()));
        }
        if data.iter().any(|h| !h.re.is_finite() || !h.im.is_finite()) {
            return Err(FitError::InvalidData("response values must be finite".into()));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FitError::InvalidData(
                "weights must be finite and non-negative".into(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(FitError::InvalidData("weights sum to zero".into()));
        }

        Ok(Self {
            f_hz: Array1::from_vec(f_hz),
            data: Array1::from_vec(data),
            weights: Array1::from_vec(weights),
        })
    }

    /// Create response data with unit weights
    pub fn unweighted(f_hz: Vec<f64>, data: Vec<Complex64>) -> Result<Self> {
        let weights = vec![1.0; f_hz.len()];
        Self::new(f_hz, data, weights)
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.f_hz.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.f_hz.is_empty()
    }

    /// Frequencies in Hz
    #[inline]
    pub fn f_hz(&self) -> &Array1<f64> {
        &self.f_hz
    }

    /// Complex response values
    #[inline]
    pub fn data(&self) -> &Array1<Complex64> {
        &self.data
    }

    /// Fitting weights
    #[inline]
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Largest sample frequency
    pub fn f_max(&self) -> f64 {
        self.f_hz.iter().cloned().fold(0.0, f64::max)
    }

    /// Weighted RMS of `model - data`, normalized by the weight energy
    pub fn weighted_rms(&self, model: &Array1<Complex64>) -> f64 {
        if model.len() != self.len() {
            return f64::NAN;
        }
        let w2: f64 = self.weights.iter().map(|w| w * w).sum();
        let err: f64 = model
            .iter()
            .zip(self.data.iter())
            .zip(self.weights.iter())
            .map(|((m, d), w)| w * w * (m - d).norm_sqr())
            .sum();
        (err / w2).sqrt()
    }
}
