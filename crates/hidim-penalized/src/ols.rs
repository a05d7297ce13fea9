//! Ordinary least squares with classical inference
//!
//! Solves the normal equations `XᵀX β = Xᵀy` by Cholesky factorization. A
//! singular or near-singular cross-product, which is guaranteed when p ≥ n,
//! is reported as [`PenalizedError::RankDeficient`] instead of producing
//! meaningless coefficients.

use crate::error::{PenalizedError, Result};
use crate::linalg::{cholesky, cholesky_inverse, cholesky_solve};
use ndarray::{Array1, Array2, Axis, concatenate};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// OLS configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OlsConfig {
    /// Include an intercept column
    pub fit_intercept: bool,

    /// Relative pivot threshold below which the cross-product is singular
    pub rank_tolerance: f64,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            rank_tolerance: 1e-10,
        }
    }
}

/// Fitted least-squares model
///
/// When an intercept is fitted, index 0 of `estimates`, `standard_errors`,
/// `t_values` and `p_values` refers to it and the features follow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OlsFit {
    /// Whether index 0 is the intercept
    pub has_intercept: bool,
    /// Point estimates
    pub estimates: Array1<f64>,
    /// Standard errors
    pub standard_errors: Array1<f64>,
    /// t statistics
    pub t_values: Array1<f64>,
    /// Two-sided p-values
    pub p_values: Array1<f64>,
    /// Residual variance σ̂²
    pub residual_variance: f64,
    /// Residual degrees of freedom
    pub df_residual: usize,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Adjusted R²
    pub adj_r_squared: f64,
    /// Fitted values
    pub fitted: Array1<f64>,
}

impl OlsFit {
    /// Feature coefficients (intercept excluded)
    pub fn coefficients(&self) -> Array1<f64> {
        if self.has_intercept {
            self.estimates.iter().skip(1).copied().collect()
        } else {
            self.estimates.clone()
        }
    }

    /// Intercept, zero when not fitted
    pub fn intercept(&self) -> f64 {
        if self.has_intercept { self.estimates[0] } else { 0.0 }
    }

    /// Predictions for new rows
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients();
        if x.ncols() != coefficients.len() {
            return Err(PenalizedError::DimensionMismatch {
                expected: coefficients.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&coefficients) + self.intercept())
    }
}

/// Least-squares estimator
#[derive(Debug, Default)]
pub struct OrdinaryLeastSquares {
    config: OlsConfig,
}

impl OrdinaryLeastSquares {
    /// Create a new estimator
    pub const fn new(config: OlsConfig) -> Self {
        Self { config }
    }

    /// Fit `y ~ X`
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<OlsFit> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(PenalizedError::DimensionMismatch {
                expected: n,
                actual: y.len(),
            });
        }

        let design = if self.config.fit_intercept {
            concatenate(Axis(1), &[Array2::<f64>::ones((n, 1)).view(), x.view()]).map_err(|e| {
                PenalizedError::InvalidParameter(format!("cannot add intercept column: {e}"))
            })?
        } else {
            x.clone()
        };
        let k = design.ncols();

        if k >= n {
            return Err(PenalizedError::RankDeficient {
                features: k,
                reason: format!("{k} parameters but only {n} observations"),
            });
        }

        // Unit-norm columns keep the factorization independent of feature units
        let norms = design
            .columns()
            .into_iter()
            .map(|c| c.dot(&c).sqrt())
            .map(|v| if v > 0.0 && v.is_finite() { v } else { 1.0 })
            .collect::<Array1<f64>>();
        let scaled = &design / &norms;

        let gram = scaled.t().dot(&scaled);
        let factor = cholesky(&gram, self.config.rank_tolerance)?;
        let estimates = cholesky_solve(&factor, &scaled.t().dot(y)) / &norms;

        let fitted = design.dot(&estimates);
        let residuals = y - &fitted;
        let rss = residuals.dot(&residuals);
        let df_residual = n - k;
        let residual_variance = rss / df_residual as f64;

        let inverse = cholesky_inverse(&factor);
        let standard_errors =
            inverse.diag().mapv(|v| (v.max(0.0) * residual_variance).sqrt()) / &norms;
        let t_values = &estimates / &standard_errors;

        let t_dist = StudentsT::new(0.0, 1.0, df_residual as f64)
            .map_err(|e| PenalizedError::InvalidParameter(format!("t distribution: {e}")))?;
        let p_values = t_values.mapv(|t| {
            if t.is_finite() {
                (2.0 * t_dist.sf(t.abs())).min(1.0)
            } else {
                f64::NAN
            }
        });

        let tss = if self.config.fit_intercept {
            let mean = y.mean().unwrap_or(0.0);
            y.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        } else {
            y.dot(y)
        };
        let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };
        let df_total = if self.config.fit_intercept { n - 1 } else { n };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * df_total as f64 / df_residual as f64;

        log::debug!(
            "OLS fit: n = {n}, p = {p}, R² = {r_squared:.4}, σ̂² = {residual_variance:.4e}"
        );

        Ok(OlsFit {
            has_intercept: self.config.fit_intercept,
            estimates,
            standard_errors,
            t_values,
            p_values,
            residual_variance,
            df_residual,
            r_squared,
            adj_r_squared,
            fitted,
        })
    }
}
