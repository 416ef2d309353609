//! AAA Fit Tests
//!
//! End-to-end tests of the AAA fit pipeline on synthetic responses.
//!
//! Test coverage:
//! - Stable third order system recovered to high accuracy
//! - Unstable system settling on a stable truncation
//! - Response without any stable truncation: fallback and forced reflection
//! - Re-committing a stabilized model changes nothing
//! - Zero order request leaves the session untouched
//! - Size accounting and hint layering

use approx::assert_relative_eq;
use num_complex::Complex64;
use zpkfit_core::fit::{
    commit_stabilized, fit_aaa, fit_aaa_base, FactorOrders, FitOutcome, FitSummary, OrderSpec,
    SearchState,
};
use zpkfit_core::zpk::model::evaluate_zpk;
use zpkfit_core::{CodingMap, FitAid, FitSession, HintStore, ResponseData};

// ============================================================================
// Helper Functions
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10f64.powf(start + (stop - start) * i as f64 / (n - 1) as f64))
        .collect()
}

/// Session on `H(s) = k / prod(s - p)` sampled at 50 log-spaced frequencies
fn session_for(poles: &[Complex64], gain: f64) -> FitSession {
    let f = logspace(-2.0, 2.0, 50);
    let data = evaluate_zpk(&[], poles, gain, &f).to_vec();
    let response = ResponseData::unweighted(f, data).unwrap();
    FitSession::new(response, CodingMap::Ri)
}

fn fitted(outcome: FitOutcome) -> FitSummary {
    match outcome {
        FitOutcome::Fitted(summary) => summary,
        FitOutcome::Skipped => panic!("fit was skipped"),
    }
}

fn relative_rms(session: &FitSession) -> f64 {
    let fitter = session.fitter();
    let data = fitter.data();
    let scale = (data.iter().map(|d| d.norm_sqr()).sum::<f64>() / data.len() as f64).sqrt();
    fitter.residual_rms() / scale
}

fn stable_three_pole() -> Vec<Complex64> {
    vec![
        Complex64::new(-1.0, 0.0),
        Complex64::new(-0.5, 2.0),
        Complex64::new(-0.5, -2.0),
    ]
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn test_stable_three_pole_system() {
    init_tracing();
    let mut session = session_for(&stable_three_pole(), 4.25);
    session.hints_mut().set("rational_fit_order", 6usize);

    let summary = fitted(fit_aaa(&mut session, None).unwrap());

    assert!(summary.order <= 6);
    assert!(matches!(summary.search, SearchState::Stable(_)));
    assert_eq!(session.n_updates(), 1);
    assert!(!session.is_representative());

    let poles = session.fitter().poles().fullplane();
    assert!(poles.len() <= 6);
    assert!(poles.iter().all(|p| p.re < 0.0));

    let rel = relative_rms(&session);
    assert!(rel < 1e-3, "relative rms {}", rel);

    // Between the samples the model tracks the true system as well
    let f_mid = [0.3, 2.1];
    let expected = evaluate_zpk(&[], &stable_three_pole(), 4.25, &f_mid);
    let model = session.fitter().response_at(&f_mid);
    for (m, e) in model.iter().zip(expected.iter()) {
        assert!((m - e).norm() < 1e-2 * e.norm(), "{} vs {}", m, e);
    }
}

#[test]
fn test_unstable_system_settles_on_stable_truncation() {
    init_tracing();
    let poles = vec![
        Complex64::new(-2.0, 0.0),
        Complex64::new(0.5, 3.0),
        Complex64::new(0.5, -3.0),
    ];
    let mut session = session_for(&poles, 10.0);
    session.hints_mut().set("rational_fit_order", 6usize);

    let summary = fitted(fit_aaa(&mut session, None).unwrap());
    assert!(matches!(summary.search, SearchState::Stable(_)));
    assert!(summary.order < summary.order_orig);

    let stable_poles = session.fitter().poles().fullplane();
    assert!(!stable_poles.is_empty());
    assert!(stable_poles.iter().all(|p| p.re < 0.0), "poles {:?}", stable_poles);
    assert_eq!(session.n_updates(), 1);
}

#[test]
fn test_no_stable_truncation_forces_reflection() {
    init_tracing();
    // H(s) = 3 / (s - 1): every truncation keeps the pole at +1
    let mut session = session_for(&[Complex64::new(1.0, 0.0)], 3.0);
    session.hints_mut().set("rational_fit_order", 6usize);

    let summary = fitted(fit_aaa(&mut session, None).unwrap());
    assert_eq!(summary.search, SearchState::Exhausted);
    assert_eq!(summary.reflected, 1);
    assert_relative_eq!(summary.refined_gain, 3.0, epsilon = 1e-6);

    let fitter = session.fitter();
    let poles = fitter.poles().fullplane();
    assert_eq!(poles.len(), 1);
    assert_relative_eq!(poles[0].re, -1.0, epsilon = 1e-6);
    assert_relative_eq!(poles[0].im, 0.0);
    // One reflection flips the gain sign
    assert_relative_eq!(fitter.gain(), -summary.refined_gain, epsilon = 1e-12);
    assert_relative_eq!(fitter.gain(), -3.0, epsilon = 1e-6);
}

#[test]
fn test_recommit_of_stable_model_is_unchanged() {
    init_tracing();
    let mut session = session_for(&[Complex64::new(1.0, 0.0)], 3.0);
    session.hints_mut().set("rational_fit_order", 6usize);
    fit_aaa(&mut session, None).unwrap();

    let committed = session.fitter().clone();
    let reflected = commit_stabilized(&mut session, &committed).unwrap();

    assert_eq!(reflected, 0);
    assert_eq!(session.n_updates(), 2);
    let fitter = session.fitter();
    assert_eq!(fitter.poles().fullplane(), committed.poles().fullplane());
    assert_eq!(fitter.zeros().fullplane(), committed.zeros().fullplane());
    assert_eq!(fitter.gain(), committed.gain());
}

#[test]
fn test_zero_order_is_a_no_op() {
    let mut session = session_for(&stable_three_pole(), 1.0);
    session.hints_mut().set("rational_AAA_fit_order", 0usize);

    let outcome = fit_aaa(&mut session, None).unwrap();
    assert_eq!(outcome, FitOutcome::Skipped);
    assert_eq!(session.n_updates(), 0);
    assert!(session.is_representative());
    assert!(session.fitter().poles().is_empty());
    assert_eq!(session.fitter().gain(), 1.0);
}

#[test]
fn test_explicit_order_hint_name() {
    let mut session = session_for(&stable_three_pole(), 1.0);
    session
        .hints_mut()
        .set("rational_fit_order", 8usize)
        .set("stage_order", 0usize);

    let outcome = fit_aaa(&mut session, Some("stage_order")).unwrap();
    assert_eq!(outcome, FitOutcome::Skipped);
}

// ============================================================================
// Order Accounting Tests
// ============================================================================

#[test]
fn test_size_accounting_keeps_minimum_order() {
    init_tracing();
    let mut session = session_for(&stable_three_pole(), 4.25).with_factor_orders(FactorOrders {
        reldeg: 0,
        factors_maxzp: 9,
    });

    let spec = OrderSpec {
        order: Some(10),
        ..Default::default()
    };
    assert_eq!(spec.resolve(&session.fitter_orders(), true).order_max, 6);

    fit_aaa_base(&mut session, &spec, true).unwrap();
    assert!(session.fitter().poles().order() <= 6);
    assert!(session.fitter().poles().fullplane().iter().all(|p| p.re < 0.0));
}

#[test]
fn test_json_hint_layers() {
    let mut hints = HintStore::new();
    hints
        .push_json_layer(r#"{"rational_fit_order": 12, "relative_degree_min": 1}"#)
        .unwrap();
    hints
        .push_json_layer(r#"{"rational_fit_order_max": 4.0}"#)
        .unwrap();

    let session = session_for(&stable_three_pole(), 1.0).with_hints(hints);
    let spec = OrderSpec::from_hints(session.hints(), None).unwrap();
    assert_eq!(spec.order, Some(12));
    assert_eq!(spec.order_max, Some(4));
    assert_eq!(spec.relative_degree, Some(0));

    let resolved = spec.resolve(&session.fitter_orders(), false);
    assert_eq!(resolved.order_max, 4);
    assert_eq!(resolved.diff_reldeg, 0);
}
