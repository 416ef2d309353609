//! AAA kernel contract
//!
//! The order search only needs a model that was fit once and can then be
//! truncated cheaply to any degree along its greedy support sequence.

use num_complex::Complex64;

/// A greedy barycentric rational model with selectable truncation
///
/// `choose` mutates the model in place: slices returned by `zeros` and
/// `poles` describe the active truncation only and cannot outlive the next
/// `choose` call.
pub trait AaaKernel {
    /// Number of finite poles of the active truncation
    ///
    /// Right after construction this is the order picked by the kernel's own
    /// convergence criterion.
    fn order(&self) -> usize;

    /// Select the largest truncation with at most `order` poles
    ///
    /// Falls back to the smallest truncation when none qualifies. No new
    /// solve is performed.
    fn choose(&mut self, order: usize);

    /// Full-plane zeros of the active truncation
    fn zeros(&self) -> &[Complex64];

    /// Full-plane poles of the active truncation
    fn poles(&self) -> &[Complex64];

    /// Real gain of the active truncation
    fn gain(&self) -> f64;

    /// Weighted RMS residual of the active truncation against the data
    fn res_rms(&self) -> f64;
}
