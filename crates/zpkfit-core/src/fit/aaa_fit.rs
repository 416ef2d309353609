//! AAA initial fit of a session model
//!
//! Resolves the orders, runs the AAA kernel, searches for a stable
//! truncation, refines it under SOS coding, reflects any remaining unstable
//! poles and commits the result as a non-representative model.

use tracing::{debug, info, warn};

use super::aid::FitAid;
use super::orders::OrderSpec;
use super::search::{search_stable_order, SearchState};
use super::stabilize::{check_stable, reflect_unstable_poles};
use crate::aaa::{AaaKernel, AaaOptions, TfAaa};
use crate::error::Result;
use crate::zpk::{CodingMap, OptimizeReport, ZpkFitter};

/// Result of an AAA fit
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    /// The resolved order was 0; nothing was fitted or committed
    Skipped,
    /// A model was committed to the session
    Fitted(FitSummary),
}

/// Details of a committed AAA fit
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// Final state of the order search
    pub search: SearchState,
    /// Order selected by the kernel before the search
    pub order_orig: usize,
    /// Order of the truncation taken from the kernel
    pub order: usize,
    /// Gain after the full optimization pass, before reflection
    pub refined_gain: f64,
    /// Poles reflected into the left half-plane after optimization
    pub reflected: usize,
    pub gain_pass: OptimizeReport,
    pub full_pass: OptimizeReport,
    /// Weighted RMS residual of the committed model
    pub res_rms: f64,
}

/// Fit the session model with AAA using orders resolved from its hints
///
/// `order_hint` names a hint tried before the default order chain.
pub fn fit_aaa<A: FitAid>(aid: &mut A, order_hint: Option<&str>) -> Result<FitOutcome> {
    let spec = OrderSpec::from_hints(aid.hints(), order_hint)?;
    fit_aaa_base(aid, &spec, true)
}

/// Fit the session model with AAA using an explicit order request
///
/// With `account_size` the maximum order is reduced by the orders held by
/// other factors, but never below 6.
pub fn fit_aaa_base<A: FitAid>(
    aid: &mut A,
    spec: &OrderSpec,
    account_size: bool,
) -> Result<FitOutcome> {
    let orders = spec.resolve(&aid.fitter_orders(), account_size);
    if orders.order == 0 {
        debug!("AAA fit skipped for order 0");
        return Ok(FitOutcome::Skipped);
    }
    info!(order_max = orders.order_max, "AAA rational fit");

    let response = aid.fitter().response_handle();
    let mut kernel = TfAaa::fit(&response, &AaaOptions::with_degree_max(orders.order_max))?;
    let search = search_stable_order(&mut kernel);

    let mut candidate = aid.fitter().regenerate(
        Some(CodingMap::Sos),
        kernel.zeros(),
        kernel.poles(),
        kernel.gain(),
        false,
    );

    let gain_pass = {
        let gain = candidate.gain_coding();
        let mut scope = candidate.with_codings_only(&[gain])?;
        scope.optimize()?
    };
    let full_pass = candidate.optimize()?;
    for (pass, report) in [("gain", &gain_pass), ("full", &full_pass)] {
        if !report.converged {
            warn!(
                pass,
                iterations = report.iterations,
                final_cost = report.final_cost,
                "AAA refinement did not converge, keeping best iterate"
            );
        }
    }

    let reflected = commit_stabilized(aid, &candidate)?;
    let res_rms = aid.fitter().residual_rms();
    info!(
        order = search.order,
        reflected,
        res_rms,
        "AAA fit committed"
    );

    Ok(FitOutcome::Fitted(FitSummary {
        search: search.state,
        order_orig: search.order_orig,
        order: search.order,
        refined_gain: candidate.gain(),
        reflected,
        gain_pass,
        full_pass,
        res_rms,
    }))
}

/// Reflect the unstable poles of `source` and commit the result to `aid`
///
/// The model is rebuilt under the session fitter's coding map with the
/// parity-corrected gain and committed as non-representative. Returns the
/// number of reflected poles.
pub fn commit_stabilized<A: FitAid>(aid: &mut A, source: &ZpkFitter) -> Result<usize> {
    let stabilized = reflect_unstable_poles(&source.poles().fullplane(), source.gain());
    let fitter = aid.fitter().regenerate(
        None,
        &source.zeros().fullplane(),
        &stabilized.poles,
        stabilized.gain,
        false,
    );
    check_stable(&fitter.poles().fullplane())?;

    aid.fitter_update(fitter, false);
    Ok(stabilized.reflected)
}
