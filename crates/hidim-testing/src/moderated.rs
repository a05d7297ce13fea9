//! Empirical-Bayes moderated t statistics
//!
//! Feature variances are modelled as draws from a scaled inverse-χ² prior
//! with `d₀` degrees of freedom and scale `s₀²`. Given the sample variance
//! s²ⱼ on d residual df, the posterior variance is
//!
//! ```text
//! s̃²ⱼ = (d₀ s₀² + d s²ⱼ) / (d₀ + d)
//! ```
//!
//! and the moderated statistic `effectⱼ / (s̃ⱼ √(1/n₀ + 1/n₁))` follows a t
//! distribution on `d + d₀` df under the null. The prior is estimated by
//! matching the first two moments of log s²ⱼ (Smyth, 2004).

use crate::adjust::AdjustmentMethod;
use crate::error::{Result, TestingError};
use crate::special::{digamma, trigamma, trigamma_inverse};
use crate::table::{TestRow, TestTable};
use crate::ttest::GroupMoments;
use hidim_data::ExpressionSet;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Estimated variance prior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorEstimate {
    /// Prior degrees of freedom d₀; infinite when the variances show no
    /// more spread than sampling noise
    pub df: f64,
    /// Prior variance s₀²
    pub variance: f64,
    /// Variances that entered the estimate
    pub n_used: usize,
}

impl PriorEstimate {
    /// Whether every feature is shrunk fully to the prior
    pub const fn is_infinite(&self) -> bool {
        self.df.is_infinite()
    }
}

/// Moment estimate of the scaled inverse-χ² prior of `variances`, each on
/// `df` residual degrees of freedom
///
/// Non-positive and non-finite variances are excluded with a warning.
pub fn fit_f_dist(variances: &[f64], df: f64) -> Result<PriorEstimate> {
    if df.is_nan() || df <= 0.0 {
        return Err(TestingError::InvalidParameter(format!(
            "residual df must be positive, got {df}"
        )));
    }

    let usable: Vec<f64> = variances
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    let excluded = variances.len() - usable.len();
    if excluded > 0 {
        log::warn!(
            "Excluding {excluded} feature(s) with zero or non-finite variance from the prior fit"
        );
    }
    if usable.len() < 2 {
        return Err(TestingError::DegenerateVariance(format!(
            "need at least two positive variances to estimate a prior, got {}",
            usable.len()
        )));
    }

    let half = df / 2.0;
    let offset = digamma(half) - half.ln();
    let e: Vec<f64> = usable.iter().map(|v| v.ln() - offset).collect();
    let n = e.len() as f64;
    let e_mean = e.iter().sum::<f64>() / n;
    let e_var = e.iter().map(|x| (x - e_mean).powi(2)).sum::<f64>() / (n - 1.0);
    let excess = e_var - trigamma(half);

    let estimate = if excess > 0.0 {
        let prior_df = 2.0 * trigamma_inverse(excess);
        let prior_half = prior_df / 2.0;
        PriorEstimate {
            df: prior_df,
            variance: (e_mean + digamma(prior_half) - prior_half.ln()).exp(),
            n_used: usable.len(),
        }
    } else {
        PriorEstimate {
            df: f64::INFINITY,
            variance: e_mean.exp(),
            n_used: usable.len(),
        }
    };

    log::info!(
        "Variance prior: d0 = {:.3}, s0^2 = {:.4e} from {} features",
        estimate.df,
        estimate.variance,
        estimate.n_used
    );
    Ok(estimate)
}

/// Posterior variances `(d₀ s₀² + d s²ⱼ) / (d₀ + d)`
pub fn squeeze_variances(variances: &Array1<f64>, df: f64, prior: &PriorEstimate) -> Array1<f64> {
    if prior.is_infinite() {
        return Array1::from_elem(variances.len(), prior.variance);
    }
    variances.mapv(|s2| (prior.df * prior.variance + df * s2) / (prior.df + df))
}

/// Moderated test configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratedConfig {
    /// Adjustment applied to the resulting table
    pub adjustment: AdjustmentMethod,
}

impl Default for ModeratedConfig {
    fn default() -> Self {
        Self {
            adjustment: AdjustmentMethod::BenjaminiHochberg,
        }
    }
}

/// Result of a moderated test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratedResult {
    /// Estimated variance prior
    pub prior: PriorEstimate,
    /// Residual df per feature
    pub residual_df: f64,
    /// Sample variances s²
    pub variances: Array1<f64>,
    /// Posterior variances s̃²
    pub shrunken_variances: Array1<f64>,
    /// Per-feature results
    pub table: TestTable,
}

/// Empirical-Bayes moderated two-group comparison
#[derive(Debug, Default)]
pub struct ModeratedTest {
    config: ModeratedConfig,
}

impl ModeratedTest {
    /// Create a new moderated test
    pub const fn new(config: ModeratedConfig) -> Self {
        Self { config }
    }

    /// Test every feature of `set`, group 1 against group 0
    pub fn run(&self, set: &ExpressionSet) -> Result<ModeratedResult> {
        let moments = GroupMoments::from_set(set)?;
        let d = moments.residual_df() as f64;
        let variances = moments.pooled_variances();

        let prior = fit_f_dist(&variances.to_vec(), d)?;
        let shrunken = squeeze_variances(&variances, d, &prior);

        let total_df = d + prior.df;
        let tail = Tail::new(total_df)?;
        let effects = moments.effects();
        let averages = moments.averages();
        let unscaled = moments.unscaled_se();

        let rows = set
            .feature_names()
            .iter()
            .enumerate()
            .map(|(f, feature)| {
                let statistic = effects[f] / (shrunken[f].sqrt() * unscaled);
                let p_value = tail.two_sided(statistic);
                TestRow {
                    feature: feature.clone(),
                    effect: effects[f],
                    average: averages[f],
                    statistic,
                    df: total_df,
                    p_value,
                    adjusted_p_value: p_value,
                }
            })
            .collect();

        let table = TestTable::new("moderated t", rows).adjust(self.config.adjustment)?;

        log::info!(
            "Moderated t: {} features, {} significant at 5% ({})",
            table.len(),
            table.significant(0.05).len(),
            table.adjustment
        );

        Ok(ModeratedResult {
            prior,
            residual_df: d,
            variances,
            shrunken_variances: shrunken,
            table,
        })
    }
}

/// Reference distribution of the moderated statistic
#[derive(Debug)]
enum Tail {
    Student(StudentsT),
    Normal(Normal),
}

impl Tail {
    fn new(df: f64) -> Result<Self> {
        if df.is_infinite() {
            Normal::new(0.0, 1.0)
                .map(Self::Normal)
                .map_err(|e| TestingError::InvalidParameter(format!("normal distribution: {e}")))
        } else {
            StudentsT::new(0.0, 1.0, df)
                .map(Self::Student)
                .map_err(|e| TestingError::InvalidParameter(format!("t distribution: {e}")))
        }
    }

    fn two_sided(&self, statistic: f64) -> f64 {
        if statistic.is_nan() {
            return f64::NAN;
        }
        let sf = match self {
            Self::Student(t) => t.sf(statistic.abs()),
            Self::Normal(z) => z.sf(statistic.abs()),
        };
        (2.0 * sf).min(1.0)
    }
}
