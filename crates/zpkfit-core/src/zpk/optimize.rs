//! Levenberg-Marquardt least squares refinement
//!
//! Minimizes `0.5 * |r(x)|^2` for a problem exposing residuals and an
//! analytic Jacobian. Each step solves the damped system
//! `[J; sqrt(lambda) * D] dx = [-r; 0]` by SVD, where `D` is the Marquardt
//! column scaling.

use ndarray::{concatenate, Array1, Array2, Axis};

use crate::constants::{
    LM_COST_TOLERANCE, LM_DAMPING_FACTOR, LM_INITIAL_DAMPING, LM_MAX_DAMPING, LM_MAX_ITERATIONS,
};
use crate::error::{FitError, Result};
use crate::math::lstsq;

/// A nonlinear least squares problem
pub trait LeastSquaresProblem {
    /// Current parameter vector
    fn params(&self) -> Array1<f64>;

    /// Replace the parameter vector
    fn set_params(&mut self, x: &Array1<f64>);

    /// Residual vector at the current parameters
    fn residuals(&self) -> Array1<f64>;

    /// Jacobian `d r / d x` at the current parameters, `[n_residuals, n_params]`
    fn jacobian(&self) -> Array2<f64>;
}

/// Tuning of the optimizer
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub max_iterations: usize,
    pub initial_damping: f64,
    pub cost_tolerance: f64,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: LM_MAX_ITERATIONS,
            initial_damping: LM_INITIAL_DAMPING,
            cost_tolerance: LM_COST_TOLERANCE,
        }
    }
}

/// Outcome of an optimization run
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeReport {
    pub initial_cost: f64,
    pub final_cost: f64,
    pub iterations: usize,
    pub converged: bool,
}

fn cost(r: &Array1<f64>) -> f64 {
    0.5 * r.dot(r)
}

/// Run Levenberg-Marquardt on `problem`
///
/// The problem is always left at the best iterate found, whether or not the
/// run converged.
pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &mut P,
    options: &OptimizeOptions,
) -> Result<OptimizeReport> {
    let mut x = problem.params();
    let mut r = problem.residuals();
    let initial_cost = cost(&r);

    let mut report = OptimizeReport {
        initial_cost,
        final_cost: initial_cost,
        iterations: 0,
        converged: false,
    };

    if x.is_empty() || r.is_empty() {
        report.converged = true;
        return Ok(report);
    }
    if !initial_cost.is_finite() {
        return Ok(report);
    }

    let n_params = x.len();
    let mut lambda = options.initial_damping;

    'outer: for iteration in 1..=options.max_iterations {
        report.iterations = iteration;
        let jac = problem.jacobian();

        // Marquardt scaling: column norms of J, unit for dead columns
        let scale: Array1<f64> = jac.map_axis(Axis(0), |col| {
            let norm = col.dot(&col).sqrt();
            if norm > 0.0 && norm.is_finite() {
                norm
            } else {
                1.0
            }
        });
        let current = cost(&r);

        loop {
            let damping = Array2::from_diag(&scale.mapv(|d| d * lambda.sqrt()));
            let a = concatenate(Axis(0), &[jac.view(), damping.view()])
                .map_err(|_| FitError::Linalg {
                    context: "levenberg_marquardt",
                    message: "shape mismatch in damped system",
                })?;
            let b = concatenate(
                Axis(0),
                &[r.mapv(|v| -v).view(), Array1::zeros(n_params).view()],
            )
            .map_err(|_| FitError::Linalg {
                context: "levenberg_marquardt",
                message: "shape mismatch in damped system",
            })?;

            let step = match lstsq(&a, &b) {
                Ok(solution) => solution,
                Err(_) => {
                    // Non-finite Jacobian; nothing more can be done from here
                    break 'outer;
                }
            };

            let candidate = &x + &step;
            problem.set_params(&candidate);
            let r_new = problem.residuals();
            let new_cost = cost(&r_new);

            if new_cost.is_finite() && new_cost < current {
                let decrease = current - new_cost;
                x = candidate;
                r = r_new;
                lambda = (lambda / LM_DAMPING_FACTOR).max(1e-15);
                if decrease <= options.cost_tolerance * current {
                    report.converged = true;
                    break 'outer;
                }
                break;
            }

            problem.set_params(&x);
            lambda *= LM_DAMPING_FACTOR;
            if lambda > LM_MAX_DAMPING {
                // No descent direction left at working precision
                report.converged = true;
                break 'outer;
            }
        }
    }

    problem.set_params(&x);
    report.final_cost = cost(&r);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Fit y = a * exp(b * t)
    struct ExpFit {
        t: Vec<f64>,
        y: Vec<f64>,
        x: Array1<f64>,
    }

    impl LeastSquaresProblem for ExpFit {
        fn params(&self) -> Array1<f64> {
            self.x.clone()
        }

        fn set_params(&mut self, x: &Array1<f64>) {
            self.x.assign(x);
        }

        fn residuals(&self) -> Array1<f64> {
            Array1::from_iter(
                self.t
                    .iter()
                    .zip(self.y.iter())
                    .map(|(t, y)| self.x[0] * (self.x[1] * t).exp() - y),
            )
        }

        fn jacobian(&self) -> Array2<f64> {
            Array2::from_shape_fn((self.t.len(), 2), |(i, j)| {
                let e = (self.x[1] * self.t[i]).exp();
                if j == 0 {
                    e
                } else {
                    self.x[0] * self.t[i] * e
                }
            })
        }
    }

    #[test]
    fn test_exponential_fit() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = t.iter().map(|t| 2.5 * (-1.3 * t).exp()).collect();
        let mut problem = ExpFit {
            t,
            y,
            x: Array1::from_vec(vec![1.0, 0.0]),
        };

        let report = levenberg_marquardt(&mut problem, &OptimizeOptions::default()).unwrap();

        assert!(report.final_cost < report.initial_cost);
        assert!(report.final_cost < 1e-16);
        assert_relative_eq!(problem.x[0], 2.5, epsilon = 1e-6);
        assert_relative_eq!(problem.x[1], -1.3, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_problem_is_converged() {
        let mut problem = ExpFit {
            t: vec![],
            y: vec![],
            x: Array1::zeros(0),
        };
        let report = levenberg_marquardt(&mut problem, &OptimizeOptions::default()).unwrap();
        assert!(report.converged);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn test_iteration_cap_keeps_best_iterate() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = t.iter().map(|t| 2.5 * (-1.3 * t).exp()).collect();
        let mut problem = ExpFit {
            t,
            y,
            x: Array1::from_vec(vec![1.0, 0.0]),
        };
        let options = OptimizeOptions {
            max_iterations: 1,
            ..Default::default()
        };

        let report = levenberg_marquardt(&mut problem, &options).unwrap();
        assert_eq!(report.iterations, 1);
        assert!(report.final_cost <= report.initial_cost);
        let r = problem.residuals();
        assert_relative_eq!(0.5 * r.dot(&r), report.final_cost, epsilon = 1e-12);
    }
}
