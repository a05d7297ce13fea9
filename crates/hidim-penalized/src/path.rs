//! Penalty paths
//!
//! A [`PenaltyPath`] is a strictly descending sequence of strictly positive
//! penalty strengths. Solvers walk it from the largest value (sparsest
//! model) down, warm-starting each fit from the previous one.

use crate::error::{PenalizedError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Smallest mixing value used when deriving `lambda_max` for Ridge-like fits
const MIN_ALPHA_FOR_PATH: f64 = 1e-3;

/// Headroom on `lambda_max` so rounding cannot leave a coefficient active
const LAMBDA_MAX_HEADROOM: f64 = 1.0 + 1e-10;

/// How a default path is generated from the data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathConfig {
    /// Number of penalty values
    pub n_lambda: usize,

    /// `lambda_min / lambda_max`; `None` picks 1e-4 when n > p, else 1e-2
    pub min_ratio: Option<f64>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            n_lambda: 100,
            min_ratio: None,
        }
    }
}

/// Strictly descending, strictly positive penalty strengths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyPath {
    values: Vec<f64>,
}

impl PenaltyPath {
    /// Validate and wrap an explicit sequence
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(PenalizedError::InvalidPath("path is empty".to_string()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(PenalizedError::InvalidPath(format!(
                "penalty {bad} is not a positive finite value"
            )));
        }
        if let Some(w) = values.windows(2).find(|w| w[1] >= w[0]) {
            return Err(PenalizedError::InvalidPath(format!(
                "path must be strictly descending, found {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(Self { values })
    }

    /// A path of a single penalty value
    pub fn single(lambda: f64) -> Result<Self> {
        Self::new(vec![lambda])
    }

    /// `n` values log-spaced from `max` down to `max * ratio`
    pub fn geometric(max: f64, ratio: f64, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(PenalizedError::InvalidPath("path needs at least one value".to_string()));
        }
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(PenalizedError::InvalidParameter(format!(
                "min ratio must lie in (0, 1), got {ratio}"
            )));
        }
        if n == 1 {
            return Self::new(vec![max]);
        }
        let log_max = max.ln();
        let step = ratio.ln() / (n - 1) as f64;
        Self::new((0..n).map(|i| (log_max + step * i as f64).exp()).collect())
    }

    /// Default path for mixing parameter `alpha` on centred data.
    ///
    /// `lambda_max = 2 max|xⱼᵀy| / max(alpha, 1e-3)` is the smallest penalty
    /// at which every Lasso coefficient is exactly zero.
    pub fn from_data(
        x: &Array2<f64>,
        y: &Array1<f64>,
        alpha: f64,
        config: &PathConfig,
    ) -> Result<Self> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(PenalizedError::DimensionMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        let max_score = x
            .t()
            .dot(y)
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if max_score <= f64::EPSILON * y.iter().map(|v| v.abs()).sum::<f64>().max(1.0) {
            return Err(PenalizedError::DegenerateResponse);
        }

        let lambda_max = LAMBDA_MAX_HEADROOM * 2.0 * max_score / alpha.max(MIN_ALPHA_FOR_PATH);
        let ratio = config
            .min_ratio
            .unwrap_or(if n > p { 1e-4 } else { 1e-2 });

        log::debug!(
            "Penalty path: lambda_max = {lambda_max:.4e}, ratio = {ratio}, n_lambda = {}",
            config.n_lambda
        );

        Self::geometric(lambda_max, ratio, config.n_lambda)
    }

    /// Penalty values, largest first
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of penalty values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; paths are non-empty by construction
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest penalty
    pub fn max(&self) -> f64 {
        self.values[0]
    }

    /// Smallest penalty
    pub fn min(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Iterate from largest to smallest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Index of the value closest to `lambda` on the log scale
    pub fn nearest_index(&self, lambda: f64) -> usize {
        let target = lambda.max(f64::MIN_POSITIVE).ln();
        self.values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.ln() - target)
                    .abs()
                    .partial_cmp(&(b.ln() - target).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map_or(0, |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case(vec![])]
    #[case(vec![1.0, 2.0])]
    #[case(vec![2.0, 2.0])]
    #[case(vec![1.0, -0.5])]
    #[case(vec![f64::NAN])]
    fn test_invalid_paths(#[case] values: Vec<f64>) {
        assert!(PenaltyPath::new(values).is_err());
    }

    #[test]
    fn test_geometric_path() {
        let path = PenaltyPath::geometric(10.0, 0.01, 3).unwrap();

        assert_relative_eq!(path.values()[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(path.values()[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(path.values()[2], 0.1, epsilon = 1e-12);
        assert_eq!(path.nearest_index(0.9), 1);
    }

    #[test]
    fn test_lambda_max_for_lasso() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
        let y = array![2.0, 1.0, -2.0, -1.0];
        let config = PathConfig {
            n_lambda: 5,
            min_ratio: Some(0.1),
        };
        let path = PenaltyPath::from_data(&x, &y, 1.0, &config).unwrap();

        // x1ᵀy = 4, x2ᵀy = 2
        assert_relative_eq!(path.max(), 8.0, epsilon = 1e-8);
        assert_relative_eq!(path.min(), 0.8, epsilon = 1e-8);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_constant_response_rejected() {
        let x = array![[1.0], [-1.0]];
        let y = array![0.0, 0.0];
        assert!(matches!(
            PenaltyPath::from_data(&x, &y, 1.0, &PathConfig::default()),
            Err(PenalizedError::DegenerateResponse)
        ));
    }
}
