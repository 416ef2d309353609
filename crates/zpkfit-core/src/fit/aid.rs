//! Fit session: hints, the current model and its commit log

use std::rc::Rc;

use tracing::debug;

use super::orders::FactorOrders;
use crate::error::Result;
use crate::hints::{FromHint, HintStore, HintValue};
use crate::response::ResponseData;
use crate::zpk::{CodingMap, ZpkFitter};

/// Collaborator interface the fit routines run against
pub trait FitAid {
    /// Layered configuration of the session
    fn hints(&self) -> &HintStore;

    /// Current model; also exposes the response data
    fn fitter(&self) -> &ZpkFitter;

    /// Orders held by factors outside the fitted model
    fn fitter_orders(&self) -> FactorOrders;

    /// Commit `fitter` as the current model
    fn fitter_update(&mut self, fitter: ZpkFitter, representative: bool);

    /// First present hint of the name chain
    fn hint(&self, names: &[&str]) -> Option<&HintValue> {
        self.hints().get(names).map(|(_, value)| value)
    }

    fn resolve_hint<T: FromHint>(&self, names: &[&str]) -> Result<Option<T>>
    where
        Self: Sized,
    {
        self.hints().resolve(names)
    }
}

/// Self-contained [`FitAid`] holding one model
#[derive(Debug, Clone)]
pub struct FitSession {
    hints: HintStore,
    fitter: ZpkFitter,
    factor_orders: FactorOrders,
    representative: bool,
    n_updates: usize,
}

impl FitSession {
    /// Start a session on `response` with the constant model
    pub fn new(response: ResponseData, coding_map: CodingMap) -> Self {
        Self {
            hints: HintStore::new(),
            fitter: ZpkFitter::new(Rc::new(response), coding_map),
            factor_orders: FactorOrders::default(),
            representative: true,
            n_updates: 0,
        }
    }

    pub fn with_hints(mut self, hints: HintStore) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_factor_orders(mut self, factor_orders: FactorOrders) -> Self {
        self.factor_orders = factor_orders;
        self
    }

    pub fn hints_mut(&mut self) -> &mut HintStore {
        &mut self.hints
    }

    /// Whether the current model is the canonical fit rather than a candidate
    pub fn is_representative(&self) -> bool {
        self.representative
    }

    /// Number of commits made through [`FitAid::fitter_update`]
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }
}

impl FitAid for FitSession {
    fn hints(&self) -> &HintStore {
        &self.hints
    }

    fn fitter(&self) -> &ZpkFitter {
        &self.fitter
    }

    fn fitter_orders(&self) -> FactorOrders {
        self.factor_orders
    }

    fn fitter_update(&mut self, fitter: ZpkFitter, representative: bool) {
        self.n_updates += 1;
        debug!(
            n_updates = self.n_updates,
            representative,
            n_poles = fitter.poles().order(),
            n_zeros = fitter.zeros().order(),
            res_rms = fitter.residual_rms(),
            "fitter updated"
        );
        self.fitter = fitter;
        self.representative = representative;
    }
}
