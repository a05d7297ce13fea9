//! Synthetic datasets
//!
//! Seeded generators for the two settings the toolkit is exercised on:
//! sparse linear models with many more features than informative ones, and
//! two-group expression experiments where most genes are null.
//!
//! Gene-specific variances can be drawn from the scaled inverse chi-square
//! prior assumed by the moderated t-test, so the prior estimator has a known
//! target to recover.

use crate::design::Design;
use crate::error::{DataError, Result};
use crate::expression::ExpressionSet;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{ChiSquared, Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};

/// Sparse Gaussian linear model `y = X beta + e`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseLinearModel {
    /// Number of observations
    pub n_observations: usize,

    /// Number of features
    pub n_features: usize,

    /// Leading non-zero coefficients; remaining features have zero effect
    pub coefficients: Vec<f64>,

    /// Intercept
    pub intercept: f64,

    /// Noise standard deviation
    pub noise_sd: f64,

    /// Correlation between neighbouring features (AR(1) structure)
    pub correlation: f64,

    /// RNG seed
    pub seed: u64,
}

impl Default for SparseLinearModel {
    fn default() -> Self {
        Self {
            n_observations: 100,
            n_features: 20,
            coefficients: vec![3.0, -2.0, 1.5],
            intercept: 0.0,
            noise_sd: 1.0,
            correlation: 0.0,
            seed: 42,
        }
    }
}

impl SparseLinearModel {
    /// Full length-p coefficient vector
    pub fn true_coefficients(&self) -> Array1<f64> {
        let mut beta = Array1::<f64>::zeros(self.n_features);
        for (j, &b) in self.coefficients.iter().take(self.n_features).enumerate() {
            beta[j] = b;
        }
        beta
    }

    /// Draw a design from the model
    pub fn simulate(&self) -> Result<Design> {
        if self.n_observations == 0 || self.n_features == 0 {
            return Err(DataError::InvalidParameter(
                "simulation needs at least one observation and one feature".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.correlation.abs()) {
            return Err(DataError::InvalidParameter(format!(
                "correlation must lie in (-1, 1), got {}",
                self.correlation
            )));
        }
        let noise = Normal::new(0.0, self.noise_sd)
            .map_err(|e| DataError::InvalidParameter(format!("noise sd: {e}")))?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let (n, p) = (self.n_observations, self.n_features);
        let rho = self.correlation;
        let innovation_sd = (1.0 - rho * rho).sqrt();

        let mut x = Array2::<f64>::zeros((n, p));
        for i in 0..n {
            let mut previous: f64 = StandardNormal.sample(&mut rng);
            x[[i, 0]] = previous;
            for j in 1..p {
                let z: f64 = StandardNormal.sample(&mut rng);
                previous = rho * previous + innovation_sd * z;
                x[[i, j]] = previous;
            }
        }

        let beta = self.true_coefficients();
        let mut y = x.dot(&beta);
        for v in y.iter_mut() {
            *v += self.intercept + noise.sample(&mut rng);
        }

        Design::from_arrays(x, y)
    }
}

/// Two-group expression experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionSimulation {
    /// Number of genes
    pub n_features: usize,

    /// Samples in each of the two groups
    pub samples_per_group: (usize, usize),

    /// Number of leading genes with a true group difference
    pub n_differential: usize,

    /// Mean shift of differential genes in group 1
    pub effect: f64,

    /// Prior degrees of freedom for gene variances; `None` gives every gene
    /// variance `prior_variance`
    pub prior_df: Option<f64>,

    /// Prior (typical) gene variance
    pub prior_variance: f64,

    /// RNG seed
    pub seed: u64,
}

impl Default for ExpressionSimulation {
    fn default() -> Self {
        Self {
            n_features: 1000,
            samples_per_group: (5, 5),
            n_differential: 0,
            effect: 2.0,
            prior_df: None,
            prior_variance: 1.0,
            seed: 7,
        }
    }
}

impl ExpressionSimulation {
    /// Draw gene-specific variances from the configured prior
    fn gene_variances(&self, rng: &mut StdRng) -> Result<Vec<f64>> {
        match self.prior_df {
            None => Ok(vec![self.prior_variance; self.n_features]),
            Some(d0) => {
                let chi = ChiSquared::new(d0)
                    .map_err(|e| DataError::InvalidParameter(format!("prior df: {e}")))?;
                Ok((0..self.n_features)
                    .map(|_| d0 * self.prior_variance / chi.sample(rng))
                    .collect())
            }
        }
    }

    /// Draw an expression set; group labels are `"control"` and `"treated"`
    pub fn simulate(&self) -> Result<ExpressionSet> {
        let (n0, n1) = self.samples_per_group;
        if n0 < 2 || n1 < 2 {
            return Err(DataError::InvalidParameter(
                "each group needs at least two samples".to_string(),
            ));
        }
        if self.prior_variance <= 0.0 {
            return Err(DataError::InvalidParameter(
                "prior variance must be positive".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let variances = self.gene_variances(&mut rng)?;
        let n_samples = n0 + n1;

        let mut values = Array2::<f64>::zeros((self.n_features, n_samples));
        for (g, variance) in variances.iter().enumerate() {
            let sd = variance.sqrt();
            let shift = if g < self.n_differential { self.effect } else { 0.0 };
            for s in 0..n_samples {
                let z: f64 = StandardNormal.sample(&mut rng);
                let mean = if s >= n0 { shift } else { 0.0 };
                values[[g, s]] = mean + sd * z;
            }
        }

        let names = (1..=self.n_features).map(|g| format!("gene{g}")).collect();
        let labels: Vec<String> = (0..n_samples)
            .map(|s| if s < n0 { "control" } else { "treated" }.to_string())
            .collect();

        ExpressionSet::new(values, names, &labels, Some("control"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sparse_model_shapes() {
        let model = SparseLinearModel {
            n_observations: 30,
            n_features: 50,
            ..Default::default()
        };
        let design = model.simulate().unwrap();

        assert_eq!(design.n_observations(), 30);
        assert_eq!(design.n_features(), 50);
        assert!(design.is_high_dimensional());
        assert_eq!(model.true_coefficients()[1], -2.0);
        assert_eq!(model.true_coefficients()[10], 0.0);
    }

    #[test]
    fn test_simulation_is_seeded() {
        let model = SparseLinearModel::default();
        assert_eq!(model.simulate().unwrap(), model.simulate().unwrap());
    }

    #[test]
    fn test_noise_free_response_is_exact() {
        let model = SparseLinearModel {
            noise_sd: 0.0,
            intercept: 1.0,
            ..Default::default()
        };
        let design = model.simulate().unwrap();
        let fitted = design.x().dot(&model.true_coefficients()) + 1.0;

        for (a, b) in fitted.iter().zip(design.y().iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_bad_correlation() {
        let model = SparseLinearModel {
            correlation: 1.0,
            ..Default::default()
        };
        assert!(model.simulate().is_err());
    }

    #[test]
    fn test_expression_groups() {
        let sim = ExpressionSimulation {
            n_features: 10,
            samples_per_group: (3, 4),
            ..Default::default()
        };
        let set = sim.simulate().unwrap();

        assert_eq!(set.n_features(), 10);
        assert_eq!(set.group_sizes(), (3, 4));
        assert_eq!(set.group_labels()[0], "control");
    }

    #[test]
    fn test_expression_requires_replicates() {
        let sim = ExpressionSimulation {
            samples_per_group: (1, 4),
            ..Default::default()
        };
        assert!(sim.simulate().is_err());
    }
}
