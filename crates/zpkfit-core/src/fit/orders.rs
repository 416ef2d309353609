//! Order resolution from layered hints
//!
//! Turns the order-related hints of a fit session into the concrete order
//! bounds handed to the AAA kernel.

use tracing::debug;

use crate::constants::{
    DEFAULT_ORDER, MIN_ACCOUNTED_ORDER_MAX, ORDER_HINTS, ORDER_MAX_HINTS, ORDER_MIN_HINTS,
    RELATIVE_DEGREE_HINT, RELATIVE_DEGREE_MAX_HINT, RELATIVE_DEGREE_MIN_HINT,
};
use crate::error::Result;
use crate::hints::HintStore;

/// Orders already held by other factors of the session model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactorOrders {
    /// Relative degree of the other factors
    pub reldeg: i64,
    /// Largest of zero count and pole count of the other factors
    pub factors_maxzp: usize,
}

/// Order request as found in the hints; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    pub order: Option<usize>,
    pub order_max: Option<usize>,
    pub order_min: Option<usize>,
    pub relative_degree: Option<i64>,
}

/// Concrete order bounds for one fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOrders {
    pub order: usize,
    pub order_max: usize,
    pub order_min: Option<usize>,
    pub relative_degree: Option<i64>,
    /// Resolved relative degree minus that of the other factors, 0 if unresolved
    pub diff_reldeg: i64,
}

impl OrderSpec {
    /// Read an order request from the hints
    ///
    /// An explicit `order_hint` name is tried before the default order chain.
    pub fn from_hints(hints: &HintStore, order_hint: Option<&str>) -> Result<Self> {
        let order_names: Vec<&str> = order_hint
            .into_iter()
            .chain(ORDER_HINTS.iter().copied())
            .collect();

        Ok(Self {
            order: hints.resolve(&order_names)?,
            order_max: hints.resolve(&ORDER_MAX_HINTS)?,
            order_min: hints.resolve(&ORDER_MIN_HINTS)?,
            relative_degree: resolve_relative_degree(hints)?,
        })
    }

    /// Apply defaults and, with `account_size`, the orders used by other factors
    pub fn resolve(&self, factor_orders: &FactorOrders, account_size: bool) -> ResolvedOrders {
        let order = self.order.unwrap_or(DEFAULT_ORDER);
        let mut order_max = match self.order_max {
            Some(order_max) => order.min(order_max),
            None => order,
        };
        if account_size {
            order_max = order_max
                .saturating_sub(factor_orders.factors_maxzp)
                .max(MIN_ACCOUNTED_ORDER_MAX);
        }

        let diff_reldeg = self
            .relative_degree
            .map_or(0, |reldeg| reldeg - factor_orders.reldeg);

        let resolved = ResolvedOrders {
            order,
            order_max,
            order_min: self.order_min,
            relative_degree: self.relative_degree,
            diff_reldeg,
        };
        debug!(
            order,
            order_max,
            order_min = ?resolved.order_min,
            relative_degree = ?resolved.relative_degree,
            diff_reldeg,
            "resolved AAA fit orders"
        );
        resolved
    }
}

/// `relative_degree`, else the floor average of both bounds, else 0 for one bound
fn resolve_relative_degree(hints: &HintStore) -> Result<Option<i64>> {
    if let Some(reldeg) = hints.resolve::<i64>(&[RELATIVE_DEGREE_HINT])? {
        return Ok(Some(reldeg));
    }
    let reldeg_min = hints.resolve::<i64>(&[RELATIVE_DEGREE_MIN_HINT])?;
    let reldeg_max = hints.resolve::<i64>(&[RELATIVE_DEGREE_MAX_HINT])?;
    Ok(match (reldeg_min, reldeg_max) {
        (Some(lo), Some(hi)) => Some((lo + hi).div_euclid(2)),
        (Some(_), None) | (None, Some(_)) => Some(0),
        (None, None) => None,
    })
}
