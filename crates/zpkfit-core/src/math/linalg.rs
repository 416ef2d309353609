//! Linear algebra operations
//!
//! This module provides a unified interface for the matrix operations the
//! fitting code needs. It uses nalgebra as the backend; all
//! ndarray<->nalgebra conversions are contained here.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::constants::SVD_CUTOFF;

// ============================================================================
// Conversion helpers (internal)
// ============================================================================

/// Convert ndarray Array2<f64> to nalgebra DMatrix<f64>
#[inline]
fn to_na_real(a: &Array2<f64>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| a[[i, j]])
}

// ============================================================================
// Eigenvalue decomposition
// ============================================================================

/// Compute complex eigenvalues of a real matrix
///
/// Complex eigenvalues of a real matrix come out in exact conjugate pairs.
pub fn eigenvalues(a: &Array2<f64>) -> Result<Vec<Complex64>, &'static str> {
    let (m, n) = a.dim();
    if m != n {
        return Err("Matrix must be square");
    }
    if m == 0 {
        return Ok(Vec::new());
    }
    if a.iter().any(|x| !x.is_finite()) {
        return Err("Matrix has non-finite entries");
    }

    let mat = to_na_real(a);
    let eigs = mat.complex_eigenvalues();

    Ok(eigs.iter().map(|e| Complex64::new(e.re, e.im)).collect())
}

// ============================================================================
// Singular Value Decomposition
// ============================================================================

/// Right singular vector belonging to the smallest singular value
///
/// Wide matrices are padded with zero rows so that the full right singular
/// basis is available. Returns the vector (unit norm) and the smallest
/// singular value.
pub fn min_right_singular_vector(a: &Array2<f64>) -> Result<(Array1<f64>, f64), &'static str> {
    let (m, n) = a.dim();
    if n == 0 {
        return Err("Empty matrix");
    }
    if a.iter().any(|x| !x.is_finite()) {
        return Err("Matrix has non-finite entries");
    }

    let rows = m.max(n);
    let mat = DMatrix::from_fn(rows, n, |i, j| if i < m { a[[i, j]] } else { 0.0 });
    let svd = mat.svd(false, true);
    let v_t = svd.v_t.ok_or("SVD failed: no Vh matrix")?;

    let (idx, sigma) = svd
        .singular_values
        .iter()
        .cloned()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, s)| if s < best.1 { (i, s) } else { best });

    let v = Array1::from_shape_fn(n, |j| v_t[(idx, j)]);
    Ok((v, sigma))
}

// ============================================================================
// Least Squares
// ============================================================================

/// Solve least squares problem Ax = b using SVD
///
/// Singular values below `SVD_CUTOFF` times the largest are truncated, so
/// rank-deficient systems return the minimum-norm solution.
pub fn lstsq(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, &'static str> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err("Empty matrix");
    }
    if b.len() != m {
        return Err("Dimension mismatch");
    }
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return Err("Non-finite entries in least squares problem");
    }

    let a_na = to_na_real(a);
    let b_na = DVector::from_fn(m, |i, _| b[i]);

    let svd = a_na.svd(true, true);
    let s_max = svd.singular_values.iter().cloned().fold(0.0, f64::max);
    let solution = svd
        .solve(&b_na, SVD_CUTOFF * s_max.max(f64::MIN_POSITIVE))
        .map_err(|_| "SVD solve failed")?;

    Ok(Array1::from_iter(solution.iter().cloned()))
}
