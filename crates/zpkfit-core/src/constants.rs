//! Constants for AAA fitting
//!
//! Centralizes magic numbers to improve code clarity and maintainability.

// ============================================================================
// Order resolution
// ============================================================================

/// Order used when no order hint resolves
pub const DEFAULT_ORDER: usize = 20;

/// Floor for the maximum order after subtracting orders held by other factors
pub const MIN_ACCOUNTED_ORDER_MAX: usize = 6;

// ============================================================================
// Hint names
// ============================================================================

pub const ORDER_HINTS: [&str; 3] = [
    "rational_AAA_fit_order",
    "rational_fit_order",
    "order_initial",
];

pub const ORDER_MAX_HINTS: [&str; 3] = [
    "rational_AAA_fit_order_max",
    "rational_fit_order_max",
    "order_max",
];

pub const ORDER_MIN_HINTS: [&str; 3] = [
    "rational_AAA_fit_order_min",
    "rational_fit_order_min",
    "order_min",
];

pub const RELATIVE_DEGREE_HINT: &str = "relative_degree";
pub const RELATIVE_DEGREE_MIN_HINT: &str = "relative_degree_min";
pub const RELATIVE_DEGREE_MAX_HINT: &str = "relative_degree_max";

// ============================================================================
// Numerical tolerances
// ============================================================================

/// Tolerance (relative to magnitude) for treating a root as real
pub const REAL_ROOT_TOLERANCE: f64 = 1e-10;

/// Default AAA residual tolerance, relative to the largest data magnitude
pub const AAA_RES_TOLERANCE: f64 = 1e-13;

/// Roots farther than this multiple of the largest sample frequency are
/// treated as roots at infinity
pub const AAA_ROOT_CUTOFF: f64 = 1e3;

/// Cutoff for singular values in least squares solves
pub const SVD_CUTOFF: f64 = 1e-14;

// ============================================================================
// Levenberg-Marquardt parameters
// ============================================================================

pub const LM_MAX_ITERATIONS: usize = 200;
pub const LM_INITIAL_DAMPING: f64 = 1e-3;
pub const LM_DAMPING_FACTOR: f64 = 10.0;
pub const LM_MAX_DAMPING: f64 = 1e16;

/// Relative cost decrease below which the optimizer is considered converged
pub const LM_COST_TOLERANCE: f64 = 1e-12;
