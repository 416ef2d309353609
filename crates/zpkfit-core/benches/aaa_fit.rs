//! Benchmarks for the AAA fit
//!
//! Measures the AAA kernel alone and the full fit pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num_complex::Complex64;
use zpkfit_core::aaa::{AaaOptions, TfAaa};
use zpkfit_core::fit::fit_aaa;
use zpkfit_core::zpk::model::evaluate_zpk;
use zpkfit_core::{CodingMap, FitSession, ResponseData};

/// Response of a fourth order system sampled at `nfreq` log-spaced points
fn create_test_response(nfreq: usize) -> ResponseData {
    let f: Vec<f64> = (0..nfreq)
        .map(|i| 10f64.powf(-2.0 + 4.0 * i as f64 / (nfreq - 1) as f64))
        .collect();
    let zeros = [Complex64::new(-3.0, 0.0)];
    let poles = [
        Complex64::new(-0.2, 1.5),
        Complex64::new(-0.2, -1.5),
        Complex64::new(-1.0, 8.0),
        Complex64::new(-1.0, -8.0),
    ];
    let data = evaluate_zpk(&zeros, &poles, 20.0, &f).to_vec();
    ResponseData::unweighted(f, data).unwrap()
}

fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("aaa_kernel");

    for nfreq in [50, 200, 800] {
        let response = create_test_response(nfreq);
        group.bench_with_input(BenchmarkId::from_parameter(nfreq), &response, |b, r| {
            b.iter(|| TfAaa::fit(black_box(r), &AaaOptions::with_degree_max(12)))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("aaa_fit_pipeline");
    group.sample_size(10);

    let response = create_test_response(200);
    group.bench_function("order_8", |b| {
        b.iter(|| {
            let mut session = FitSession::new(response.clone(), CodingMap::Sos);
            session.hints_mut().set("rational_fit_order", 8usize);
            fit_aaa(black_box(&mut session), None)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_kernel, bench_pipeline);
criterion_main!(benches);
