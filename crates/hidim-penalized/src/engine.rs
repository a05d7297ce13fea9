//! Penalized-fit engine interface
//!
//! Every solver minimizes, for each λ on a [`PenaltyPath`],
//!
//! ```text
//! RSS(β) + λ (α ‖β‖₁ + (1 − α) ‖β‖₂²)
//! ```
//!
//! with an unpenalized intercept. α = 0 is Ridge, α = 1 is Lasso.

use crate::error::{PenalizedError, Result};
use crate::path::{PathConfig, PenaltyPath};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// A solver that produces coefficient paths
pub trait PenalizedFit {
    /// Mixing parameter α ∈ [0, 1]
    fn alpha(&self) -> f64;

    /// Path generation settings
    fn path_config(&self) -> &PathConfig;

    /// Column handling applied before solving
    fn preprocessing(&self) -> Preprocessing;

    /// Fit one coefficient vector per penalty value in `path`
    fn fit_path(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        path: &PenaltyPath,
    ) -> Result<CoefficientPath>;

    /// Data-driven default path, computed on the preprocessed problem
    fn default_path(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<PenaltyPath> {
        let problem = PreparedProblem::new(x, y, self.preprocessing())?;
        PenaltyPath::from_data(&problem.x, &problem.y, self.alpha(), self.path_config())
    }

    /// Fit along the default path
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<CoefficientPath> {
        let path = self.default_path(x, y)?;
        self.fit_path(x, y, &path)
    }
}

/// Intercept and scaling behaviour shared by all solvers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preprocessing {
    /// Fit an unpenalized intercept by centring X and y
    pub fit_intercept: bool,

    /// Scale columns to unit variance before penalizing; coefficients are
    /// reported on the original scale
    pub standardize: bool,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            standardize: true,
        }
    }
}

/// Centred (and optionally scaled) copy of the data plus what is needed to
/// map solutions back
#[derive(Debug, Clone)]
pub(crate) struct PreparedProblem {
    pub(crate) x: Array2<f64>,
    pub(crate) y: Array1<f64>,
    x_mean: Array1<f64>,
    y_mean: f64,
    x_scale: Array1<f64>,
}

impl PreparedProblem {
    pub(crate) fn new(
        x: &Array2<f64>,
        y: &Array1<f64>,
        preprocessing: Preprocessing,
    ) -> Result<Self> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(PenalizedError::DimensionMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        if n == 0 || p == 0 {
            return Err(PenalizedError::InsufficientData {
                required: 1,
                actual: n.min(p),
            });
        }

        let (x_mean, y_mean) = if preprocessing.fit_intercept {
            (
                x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p)),
                y.mean().unwrap_or(0.0),
            )
        } else {
            (Array1::zeros(p), 0.0)
        };

        let mut xc = x - &x_mean.view().insert_axis(Axis(0));
        let yc = y.mapv(|v| v - y_mean);

        let mut x_scale = Array1::<f64>::ones(p);
        if preprocessing.standardize {
            for (j, mut column) in xc.axis_iter_mut(Axis(1)).enumerate() {
                let sd = (column.iter().map(|v| v * v).sum::<f64>() / n as f64).sqrt();
                if sd > 1e-12 {
                    column.mapv_inplace(|v| v / sd);
                    x_scale[j] = sd;
                }
            }
        }

        Ok(Self {
            x: xc,
            y: yc,
            x_mean,
            y_mean,
            x_scale,
        })
    }

    /// Map a solution of the prepared problem to `(coefficients, intercept)`
    /// on the original scale
    pub(crate) fn restore(&self, beta: ArrayView1<'_, f64>) -> (Array1<f64>, f64) {
        let coefficients = &beta / &self.x_scale;
        let intercept = self.y_mean - coefficients.dot(&self.x_mean);
        (coefficients, intercept)
    }
}

/// Coefficients along a penalty path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientPath {
    lambdas: PenaltyPath,
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
    iterations: Vec<usize>,
    converged: Vec<bool>,
}

impl CoefficientPath {
    pub(crate) fn new(
        lambdas: PenaltyPath,
        coefficients: Array2<f64>,
        intercepts: Array1<f64>,
        iterations: Vec<usize>,
        converged: Vec<bool>,
    ) -> Self {
        Self {
            lambdas,
            coefficients,
            intercepts,
            iterations,
            converged,
        }
    }

    /// Penalty values, largest first
    pub const fn lambdas(&self) -> &PenaltyPath {
        &self.lambdas
    }

    /// Number of fits on the path
    pub fn len(&self) -> usize {
        self.lambdas.len()
    }

    /// Always false; paths are non-empty
    pub fn is_empty(&self) -> bool {
        self.lambdas.is_empty()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.coefficients.ncols()
    }

    /// Coefficient matrix, one row per penalty value
    pub const fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Coefficients of the `index`-th fit
    pub fn coefficients_at(&self, index: usize) -> ArrayView1<'_, f64> {
        self.coefficients.row(index)
    }

    /// Intercept of the `index`-th fit
    pub fn intercept_at(&self, index: usize) -> f64 {
        self.intercepts[index]
    }

    /// Intercepts along the path
    pub const fn intercepts(&self) -> &Array1<f64> {
        &self.intercepts
    }

    /// Solver iterations spent on each fit
    pub fn iterations(&self) -> &[usize] {
        &self.iterations
    }

    /// Whether each fit met its tolerance
    pub fn converged(&self) -> &[bool] {
        &self.converged
    }

    /// Number of exactly non-zero coefficients of the `index`-th fit
    pub fn n_nonzero(&self, index: usize) -> usize {
        self.coefficients.row(index).iter().filter(|&&b| b != 0.0).count()
    }

    /// ‖β‖₁ of the `index`-th fit
    pub fn l1_norm(&self, index: usize) -> f64 {
        self.coefficients.row(index).iter().map(|b| b.abs()).sum()
    }

    /// ‖β‖₂ of the `index`-th fit
    pub fn l2_norm(&self, index: usize) -> f64 {
        self.coefficients.row(index).iter().map(|b| b * b).sum::<f64>().sqrt()
    }

    /// Predictions of the `index`-th fit for new rows
    pub fn predict(&self, x: &Array2<f64>, index: usize) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features() {
            return Err(PenalizedError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients.row(index)) + self.intercepts[index])
    }

    /// Predictions for every fit; one column per penalty value
    pub fn predict_all(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(PenalizedError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients.t()) + &self.intercepts.view().insert_axis(Axis(0)))
    }
}
