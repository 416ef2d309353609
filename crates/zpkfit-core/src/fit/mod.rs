//! AAA-based model fitting
//!
//! - `orders` - Order resolution from hints
//! - `search` - Stable truncation search over an [`AaaKernel`](crate::aaa::AaaKernel)
//! - `stabilize` - Right-half-plane pole reflection
//! - `aid` - Fit session interface
//! - `aaa_fit` - The full fit pipeline

mod aaa_fit;
pub mod aid;
pub mod orders;
pub mod search;
pub mod stabilize;

pub use aaa_fit::{commit_stabilized, fit_aaa, fit_aaa_base, FitOutcome, FitSummary};
pub use aid::{FitAid, FitSession};
pub use orders::{FactorOrders, OrderSpec, ResolvedOrders};
pub use search::{search_stable_order, SearchOutcome, SearchState};
pub use stabilize::{check_stable, reflect_unstable_poles, Stabilized};
