//! Benchmarks for coordinate-descent and Ridge paths.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hidim_penalized::{ElasticNet, ElasticNetConfig, PenalizedFit, RidgeSolver};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use std::hint::black_box;

fn sparse_problem(n: usize, p: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(11);
    let x = Array2::from_shape_fn((n, p), |_| StandardNormal.sample(&mut rng));
    let mut beta = Array1::<f64>::zeros(p);
    for j in 0..p.min(10) {
        beta[j] = 1.0 + j as f64 * 0.25;
    }
    let noise = Array1::from_shape_fn(n, |_| {
        let z: f64 = StandardNormal.sample(&mut rng);
        0.5 * z
    });
    let y = x.dot(&beta) + noise;
    (x, y)
}

fn bench_lasso_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("lasso_path");
    group.sample_size(10);

    for &(n, p) in &[(100, 50), (100, 500), (200, 2000)] {
        let (x, y) = sparse_problem(n, p);
        let engine = ElasticNet::lasso();
        group.bench_with_input(BenchmarkId::from_parameter(format!("{n}x{p}")), &(n, p), |b, _| {
            b.iter(|| engine.fit(black_box(&x), black_box(&y)).unwrap());
        });
    }

    group.finish();
}

fn bench_elastic_net_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("elastic_net_path");
    group.sample_size(10);

    let (x, y) = sparse_problem(100, 500);
    for alpha in [0.1, 0.5, 0.9] {
        let engine = ElasticNet::new(ElasticNetConfig {
            alpha,
            ..Default::default()
        })
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(alpha), &alpha, |b, _| {
            b.iter(|| engine.fit(black_box(&x), black_box(&y)).unwrap());
        });
    }

    group.finish();
}

fn bench_ridge_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("ridge_path");
    group.sample_size(10);

    for &(n, p) in &[(100, 50), (50, 200)] {
        let (x, y) = sparse_problem(n, p);
        let engine = RidgeSolver::default();
        group.bench_with_input(BenchmarkId::from_parameter(format!("{n}x{p}")), &(n, p), |b, _| {
            b.iter(|| engine.fit(black_box(&x), black_box(&y)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lasso_path, bench_elastic_net_path, bench_ridge_path);
criterion_main!(benches);
