//! Integration tests for penalized paths, OLS and cross-validation.

use approx::assert_abs_diff_eq;
use hidim_penalized::{
    CrossValidation, CrossValidationConfig, ElasticNet, ElasticNetConfig, OrdinaryLeastSquares,
    PenaltyPath, PenalizedFit, Preprocessing, RidgeConfig, RidgeSolver, SelectionRule,
};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, StandardNormal};

fn simulate(n: usize, p: usize, active: &[(usize, f64)], seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, p), |_| StandardNormal.sample(&mut rng));
    let mut beta = Array1::<f64>::zeros(p);
    for &(j, b) in active {
        beta[j] = b;
    }
    let noise = Normal::new(0.0, 1.0).unwrap();
    let y = x.dot(&beta) + Array1::from_shape_fn(n, |_| noise.sample(&mut rng)) + 3.0;
    (x, y)
}

fn unscaled() -> Preprocessing {
    Preprocessing {
        fit_intercept: true,
        standardize: false,
    }
}

#[test]
fn test_ridge_near_zero_penalty_matches_ols() {
    let (x, y) = simulate(40, 4, &[(0, 1.5), (2, -2.0)], 1);

    let ols = OrdinaryLeastSquares::default().fit(&x, &y).unwrap();
    let ridge = RidgeSolver::default()
        .fit_path(&x, &y, &PenaltyPath::single(1e-9).unwrap())
        .unwrap();

    let ols_coef = ols.coefficients();
    for j in 0..4 {
        assert_abs_diff_eq!(ridge.coefficients_at(0)[j], ols_coef[j], epsilon = 1e-6);
    }
    assert_abs_diff_eq!(ridge.intercept_at(0), ols.intercept(), epsilon = 1e-6);
}

#[test]
fn test_ridge_l2_norm_shrinks_monotonically() {
    let (x, y) = simulate(30, 60, &[(0, 2.0), (5, -1.0), (9, 1.0)], 2);
    let ridge = RidgeSolver::new(RidgeConfig {
        preprocessing: unscaled(),
        ..Default::default()
    });

    let fit = ridge.fit(&x, &y).unwrap();

    for i in 1..fit.len() {
        assert!(fit.l2_norm(i) >= fit.l2_norm(i - 1) - 1e-10);
    }
}

#[test]
fn test_lasso_l1_norm_shrinks_monotonically() {
    let (x, y) = simulate(50, 20, &[(0, 2.0), (3, -1.5), (7, 1.0)], 3);
    let lasso = ElasticNet::new(ElasticNetConfig {
        preprocessing: unscaled(),
        ..Default::default()
    })
    .unwrap();

    let fit = lasso.fit(&x, &y).unwrap();

    assert_eq!(fit.n_nonzero(0), 0);
    for i in 1..fit.len() {
        assert!(fit.l1_norm(i) >= fit.l1_norm(i - 1) - 1e-6);
    }
}

#[test]
fn test_lasso_small_penalty_matches_ols() {
    let (x, y) = simulate(60, 3, &[(0, 1.0), (1, -1.0), (2, 0.5)], 4);

    let ols = OrdinaryLeastSquares::default().fit(&x, &y).unwrap();
    let lasso = ElasticNet::new(ElasticNetConfig {
        tolerance: 1e-14,
        ..Default::default()
    })
    .unwrap()
    .fit_path(&x, &y, &PenaltyPath::single(1e-10).unwrap())
    .unwrap();

    let ols_coef = ols.coefficients();
    for j in 0..3 {
        assert_abs_diff_eq!(lasso.coefficients_at(0)[j], ols_coef[j], epsilon = 1e-5);
    }
}

#[test]
fn test_cross_validated_lasso_recovers_support() {
    let active = [(0, 3.0), (1, -3.0), (2, 2.5), (3, -2.5), (4, 3.0)];
    let (x, y) = simulate(100, 200, &active, 5);
    let engine = ElasticNet::lasso();

    let config = CrossValidationConfig {
        folds: 5,
        rule: SelectionRule::OneStandardError,
        seed: 9,
        ..Default::default()
    };
    let cv = CrossValidation::new(config).run(&engine, &x, &y).unwrap();
    let path = engine.fit_path(&x, &y, &cv.lambdas).unwrap();
    let beta = path.coefficients_at(cv.selected_index());

    for &(j, b) in &active {
        assert!(beta[j] * b > 0.0, "feature {j} missing or wrong sign");
    }
    assert!(path.n_nonzero(cv.selected_index()) < 40);
    assert!(cv.skipped_folds.is_empty());
}

#[test]
fn test_elastic_net_in_p_greater_than_n() {
    let (x, y) = simulate(30, 100, &[(0, 2.0), (1, 2.0)], 6);
    let engine = ElasticNet::new(ElasticNetConfig {
        alpha: 0.5,
        ..Default::default()
    })
    .unwrap();

    let fit = engine.fit(&x, &y).unwrap();
    let predictions = fit.predict_all(&x).unwrap();

    assert_eq!(predictions.dim(), (30, fit.len()));
    assert!(fit.converged().iter().all(|&c| c));
    assert!(OrdinaryLeastSquares::default().fit(&x, &y).is_err());
}
