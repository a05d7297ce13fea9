//! Elastic-Net and Lasso by cyclic coordinate descent
//!
//! For α ∈ (0, 1] there is no closed form. Each coordinate update solves the
//! one-dimensional problem exactly:
//!
//! ```text
//! βⱼ ← S(xⱼᵀrⱼ, λα/2) / (xⱼᵀxⱼ + λ(1 − α))
//! ```
//!
//! where rⱼ is the partial residual without feature j and S the soft
//! threshold. The path is fitted from the largest λ down with warm starts.
//! After each full sweep the solver iterates over the active set only, then
//! confirms with another full sweep (Friedman, Hastie & Tibshirani, 2010).

use crate::engine::{CoefficientPath, PenalizedFit, PreparedProblem, Preprocessing};
use crate::error::{PenalizedError, Result};
use crate::path::{PathConfig, PenaltyPath};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Elastic-Net solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticNetConfig {
    /// Mixing parameter: 1 = Lasso, values toward 0 approach Ridge
    pub alpha: f64,

    /// Maximum full sweeps per penalty value
    pub max_iterations: usize,

    /// Convergence threshold on max_j xⱼᵀxⱼ Δβⱼ², relative to ‖y‖²
    pub tolerance: f64,

    /// Fail with [`PenalizedError::NotConverged`] instead of flagging the fit
    pub strict: bool,

    /// Intercept and scaling behaviour
    pub preprocessing: Preprocessing,

    /// Default path generation
    pub path: PathConfig,
}

impl Default for ElasticNetConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 10_000,
            tolerance: 1e-9,
            strict: true,
            preprocessing: Preprocessing::default(),
            path: PathConfig::default(),
        }
    }
}

/// Coordinate-descent Elastic-Net solver
#[derive(Debug, Default)]
pub struct ElasticNet {
    config: ElasticNetConfig,
}

impl ElasticNet {
    /// Create a new solver; α must lie in (0, 1]
    pub fn new(config: ElasticNetConfig) -> Result<Self> {
        if !(config.alpha > 0.0 && config.alpha <= 1.0) {
            return Err(PenalizedError::InvalidParameter(format!(
                "alpha must lie in (0, 1] for coordinate descent, got {}; use RidgeSolver for alpha = 0",
                config.alpha
            )));
        }
        if config.tolerance <= 0.0 || config.max_iterations == 0 {
            return Err(PenalizedError::InvalidParameter(
                "tolerance and max_iterations must be positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Lasso (α = 1) with default settings
    pub fn lasso() -> Self {
        Self::default()
    }

    /// Configuration in use
    pub const fn config(&self) -> &ElasticNetConfig {
        &self.config
    }
}

/// Mutable state of one coordinate-descent run
struct CoordinateState<'a> {
    x: &'a Array2<f64>,
    column_norms: Array1<f64>,
    beta: Array1<f64>,
    residual: Array1<f64>,
}

impl CoordinateState<'_> {
    /// Update coordinate `j`; returns the weighted squared change
    fn update(&mut self, j: usize, l1: f64, l2: f64) -> f64 {
        let norm = self.column_norms[j];
        if norm == 0.0 {
            return 0.0;
        }
        let column = self.x.column(j);
        let old = self.beta[j];
        let rho = column.dot(&self.residual) + norm * old;
        let new = soft_threshold(rho, l1) / (norm + l2);
        let delta = new - old;
        if delta != 0.0 {
            self.residual.scaled_add(-delta, &column);
            self.beta[j] = new;
        }
        norm * delta * delta
    }

    fn sweep(&mut self, coordinates: impl Iterator<Item = usize>, l1: f64, l2: f64) -> f64 {
        coordinates.fold(0.0_f64, |max_change, j| max_change.max(self.update(j, l1, l2)))
    }
}

/// `sign(z) · max(|z| − γ, 0)`
pub fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

impl PenalizedFit for ElasticNet {
    fn alpha(&self) -> f64 {
        self.config.alpha
    }

    fn path_config(&self) -> &PathConfig {
        &self.config.path
    }

    fn preprocessing(&self) -> Preprocessing {
        self.config.preprocessing
    }

    fn fit_path(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        path: &PenaltyPath,
    ) -> Result<CoefficientPath> {
        let problem = PreparedProblem::new(x, y, self.config.preprocessing)?;
        let p = problem.x.ncols();
        let alpha = self.config.alpha;

        let column_norms: Array1<f64> = problem
            .x
            .axis_iter(Axis(1))
            .map(|c| c.dot(&c))
            .collect();
        let threshold = self.config.tolerance * problem.y.dot(&problem.y).max(f64::MIN_POSITIVE);

        let mut state = CoordinateState {
            x: &problem.x,
            column_norms,
            beta: Array1::zeros(p),
            residual: problem.y.clone(),
        };

        let mut coefficients = Array2::<f64>::zeros((path.len(), p));
        let mut intercepts = Array1::<f64>::zeros(path.len());
        let mut iterations = Vec::with_capacity(path.len());
        let mut converged = Vec::with_capacity(path.len());

        for (i, lambda) in path.iter().enumerate() {
            let l1 = lambda * alpha / 2.0;
            let l2 = lambda * (1.0 - alpha);

            let mut sweeps = 0;
            let mut done = false;
            while sweeps < self.config.max_iterations {
                sweeps += 1;
                let change = state.sweep(0..p, l1, l2);
                if change < threshold {
                    done = true;
                    break;
                }

                // Settle the active set before the next full sweep
                let active: Vec<usize> = (0..p).filter(|&j| state.beta[j] != 0.0).collect();
                while sweeps < self.config.max_iterations {
                    sweeps += 1;
                    if state.sweep(active.iter().copied(), l1, l2) < threshold {
                        break;
                    }
                }
            }

            if !done {
                if self.config.strict {
                    return Err(PenalizedError::NotConverged {
                        lambda,
                        iterations: sweeps,
                    });
                }
                log::warn!(
                    "Coordinate descent did not converge at lambda = {lambda:.4e} after {sweeps} sweeps"
                );
            }

            log::debug!(
                "lambda = {lambda:.4e}: {} non-zero, {sweeps} sweeps",
                state.beta.iter().filter(|&&b| b != 0.0).count()
            );

            let (coef, intercept) = problem.restore(state.beta.view());
            coefficients.row_mut(i).assign(&coef);
            intercepts[i] = intercept;
            iterations.push(sweeps);
            converged.push(done);
        }

        Ok(CoefficientPath::new(
            path.clone(),
            coefficients,
            intercepts,
            iterations,
            converged,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ridge::RidgeSolver;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rstest::rstest;

    fn raw_config(alpha: f64) -> ElasticNetConfig {
        ElasticNetConfig {
            alpha,
            tolerance: 1e-14,
            preprocessing: Preprocessing {
                fit_intercept: false,
                standardize: false,
            },
            ..Default::default()
        }
    }

    /// 4 x 2 design with orthonormal columns
    fn orthonormal() -> (Array2<f64>, Array1<f64>) {
        let x = array![[0.5, 0.5], [0.5, -0.5], [0.5, 0.5], [0.5, -0.5]];
        let y = array![3.0, 1.0, 2.5, 0.2];
        (x, y)
    }

    #[rstest]
    #[case(3.0, 1.0, 2.0)]
    #[case(-3.0, 1.0, -2.0)]
    #[case(0.5, 1.0, 0.0)]
    #[case(-1.0, 1.0, 0.0)]
    fn test_soft_threshold(#[case] z: f64, #[case] gamma: f64, #[case] expected: f64) {
        assert_eq!(soft_threshold(z, gamma), expected);
    }

    #[test]
    fn test_lasso_orthonormal_soft_threshold() {
        let (x, y) = orthonormal();
        let ols = x.t().dot(&y);
        let path = PenaltyPath::new(vec![4.0, 2.0, 1.0, 0.1]).unwrap();

        let fit = ElasticNet::new(raw_config(1.0))
            .unwrap()
            .fit_path(&x, &y, &path)
            .unwrap();

        for (i, lambda) in path.iter().enumerate() {
            for j in 0..2 {
                let expected = soft_threshold(ols[j], lambda / 2.0);
                assert_abs_diff_eq!(fit.coefficients_at(i)[j], expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_small_alpha_approaches_ridge() {
        let x = array![[1.0, 0.3], [0.2, 1.0], [-0.5, 0.4], [0.9, -0.8], [0.1, 0.1]];
        let y = array![1.0, 0.5, -0.2, 1.4, 0.0];
        let path = PenaltyPath::new(vec![2.0, 0.5]).unwrap();

        let enet = ElasticNet::new(raw_config(1e-9))
            .unwrap()
            .fit_path(&x, &y, &path)
            .unwrap();
        let ridge = RidgeSolver::raw().fit_path(&x, &y, &path).unwrap();

        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(
                    enet.coefficients_at(i)[j],
                    ridge.coefficients_at(i)[j],
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_large_lambda_gives_exact_zeros() {
        let (x, y) = orthonormal();
        let path = PenaltyPath::single(1e6).unwrap();

        let fit = ElasticNet::new(ElasticNetConfig {
            alpha: 0.5,
            ..Default::default()
        })
        .unwrap()
        .fit_path(&x, &y, &path)
        .unwrap();

        assert_eq!(fit.n_nonzero(0), 0);
        assert_abs_diff_eq!(fit.intercept_at(0), y.mean().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_default_path_starts_empty() {
        let x = array![[1.0, 0.3], [0.2, 1.0], [-0.5, 0.4], [0.9, -0.8], [0.1, 0.1]];
        let y = array![1.0, 0.5, -0.2, 1.4, 0.0];

        let fit = ElasticNet::lasso().fit(&x, &y).unwrap();

        assert_eq!(fit.n_nonzero(0), 0);
        assert!(fit.n_nonzero(fit.len() - 1) > 0);
        assert!(fit.converged().iter().all(|&c| c));
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let x = array![[1.0, 0.99], [0.98, 1.0], [1.0, 1.01]];
        let y = array![1.0, 2.0, 3.0];
        let path = PenaltyPath::single(1e-6).unwrap();

        let config = ElasticNetConfig {
            max_iterations: 1,
            ..raw_config(1.0)
        };
        let result = ElasticNet::new(config.clone()).unwrap().fit_path(&x, &y, &path);
        assert!(matches!(result, Err(PenalizedError::NotConverged { .. })));

        let lenient = ElasticNet::new(ElasticNetConfig {
            strict: false,
            ..config
        })
        .unwrap()
        .fit_path(&x, &y, &path)
        .unwrap();
        assert_eq!(lenient.converged(), &[false]);
    }

    #[test]
    fn test_alpha_validation() {
        assert!(ElasticNet::new(raw_config(0.0)).is_err());
        assert!(ElasticNet::new(raw_config(1.5)).is_err());
    }
}
