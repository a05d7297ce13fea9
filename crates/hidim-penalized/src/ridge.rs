//! Ridge regression (α = 0)
//!
//! The Ridge solution has the closed form
//!
//! ```text
//! β(λ) = (XᵀX + λI)⁻¹ Xᵀy
//! ```
//!
//! One symmetric eigendecomposition serves the whole path: with
//! XᵀX = V D Vᵀ, β(λ) = V (D + λI)⁻¹ Vᵀ Xᵀy. When p > n the n x n kernel
//! XXᵀ = U D Uᵀ is decomposed instead and β(λ) = Xᵀ U (D + λI)⁻¹ Uᵀ y, which
//! is the same vector.

use crate::engine::{CoefficientPath, PenalizedFit, PreparedProblem, Preprocessing};
use crate::error::{PenalizedError, Result};
use crate::linalg::{EigenDecomposition, jacobi_eigendecomp};
use crate::path::{PathConfig, PenaltyPath};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Ridge solver configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RidgeConfig {
    /// Intercept and scaling behaviour
    pub preprocessing: Preprocessing,

    /// Default path generation
    pub path: PathConfig,
}

/// Closed-form Ridge solver
#[derive(Debug, Default)]
pub struct RidgeSolver {
    config: RidgeConfig,
}

/// Eigendecomposition of whichever Gram matrix is smaller
#[derive(Debug)]
enum Spectrum {
    /// XᵀX (p x p), used when p <= n
    Primal(EigenDecomposition),
    /// XXᵀ (n x n), used when p > n
    Dual(EigenDecomposition),
}

impl Spectrum {
    fn eigenvalues(&self) -> &Array1<f64> {
        match self {
            Self::Primal(d) | Self::Dual(d) => &d.eigenvalues,
        }
    }
}

impl RidgeSolver {
    /// Create a new Ridge solver
    pub const fn new(config: RidgeConfig) -> Self {
        Self { config }
    }

    /// Ridge without intercept or scaling: exactly `(XᵀX + λI)⁻¹Xᵀy`
    pub fn raw() -> Self {
        Self::new(RidgeConfig {
            preprocessing: Preprocessing {
                fit_intercept: false,
                standardize: false,
            },
            ..Default::default()
        })
    }

    fn decompose(x: &Array2<f64>) -> Result<Spectrum> {
        let (n, p) = x.dim();
        if p <= n {
            let gram = x.t().dot(x);
            Ok(Spectrum::Primal(jacobi_eigendecomp(&gram, 60, 1e-14)?))
        } else {
            let kernel = x.dot(&x.t());
            Ok(Spectrum::Dual(jacobi_eigendecomp(&kernel, 60, 1e-14)?))
        }
    }

    /// Effective degrees of freedom `Σ dᵢ / (dᵢ + λ)` along `path`.
    ///
    /// Computed on the preprocessed design.
    pub fn effective_df(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        path: &PenaltyPath,
    ) -> Result<Vec<f64>> {
        let problem = PreparedProblem::new(x, y, self.config.preprocessing)?;
        let spectrum = Self::decompose(&problem.x)?;
        let eigenvalues = spectrum.eigenvalues();
        Ok(path
            .iter()
            .map(|lambda| {
                eigenvalues
                    .iter()
                    .map(|&d| {
                        let d = d.max(0.0);
                        d / (d + lambda)
                    })
                    .sum()
            })
            .collect())
    }
}

impl PenalizedFit for RidgeSolver {
    fn alpha(&self) -> f64 {
        0.0
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
        let spectrum = Self::decompose(&problem.x)?;

        let mut coefficients = Array2::<f64>::zeros((path.len(), p));
        let mut intercepts = Array1::<f64>::zeros(path.len());

        match &spectrum {
            Spectrum::Primal(decomp) => {
                let v = &decomp.eigenvectors;
                let projected = v.t().dot(&problem.x.t().dot(&problem.y));
                for (i, lambda) in path.iter().enumerate() {
                    let scaled = shrink(&projected, &decomp.eigenvalues, lambda)?;
                    let beta = v.dot(&scaled);
                    let (coef, intercept) = problem.restore(beta.view());
                    coefficients.row_mut(i).assign(&coef);
                    intercepts[i] = intercept;
                }
            }
            Spectrum::Dual(decomp) => {
                let u = &decomp.eigenvectors;
                let projected = u.t().dot(&problem.y);
                for (i, lambda) in path.iter().enumerate() {
                    let scaled = shrink(&projected, &decomp.eigenvalues, lambda)?;
                    let beta = problem.x.t().dot(&u.dot(&scaled));
                    let (coef, intercept) = problem.restore(beta.view());
                    coefficients.row_mut(i).assign(&coef);
                    intercepts[i] = intercept;
                }
            }
        }

        log::debug!("Ridge path fitted: {} penalties, {} features", path.len(), p);

        Ok(CoefficientPath::new(
            path.clone(),
            coefficients,
            intercepts,
            vec![1; path.len()],
            vec![true; path.len()],
        ))
    }
}

/// Divide each spectral coordinate by `dᵢ + λ`
fn shrink(projected: &Array1<f64>, eigenvalues: &Array1<f64>, lambda: f64) -> Result<Array1<f64>> {
    let mut out = projected.clone();
    for (value, &d) in out.iter_mut().zip(eigenvalues.iter()) {
        let denom = d.max(0.0) + lambda;
        if denom <= 0.0 {
            return Err(PenalizedError::InvalidParameter(format!(
                "ridge penalty {lambda} leaves a singular system"
            )));
        }
        *value /= denom;
    }
    Ok(out)
}
