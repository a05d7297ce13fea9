//! Classical two-sample t tests, one per feature

use crate::error::{Result, TestingError};
use crate::table::{TestRow, TestTable};
use hidim_data::ExpressionSet;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Variance assumption of the two-sample t test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TTestVariant {
    /// Equal variances, n₀ + n₁ − 2 df
    #[default]
    Pooled,
    /// Unequal variances with Welch–Satterthwaite df
    Welch,
}

/// Per-feature group means and within-group sums of squares
#[derive(Debug, Clone)]
pub struct GroupMoments {
    /// Samples in group 0 and group 1
    pub sizes: (usize, usize),
    /// Group 0 means
    pub mean0: Array1<f64>,
    /// Group 1 means
    pub mean1: Array1<f64>,
    /// Group 0 sums of squared deviations
    pub ss0: Array1<f64>,
    /// Group 1 sums of squared deviations
    pub ss1: Array1<f64>,
}

impl GroupMoments {
    /// Summarize every feature of `set`; needs at least one residual df
    pub fn from_set(set: &ExpressionSet) -> Result<Self> {
        let idx = [set.group_indices(0), set.group_indices(1)];
        let labels = set.group_labels();
        for (group, indices) in idx.iter().enumerate() {
            if indices.is_empty() {
                return Err(TestingError::InsufficientReplicates {
                    group: labels[group].clone(),
                    required: 1,
                    actual: 0,
                });
            }
        }
        if idx[0].len() + idx[1].len() < 3 {
            return Err(TestingError::InsufficientReplicates {
                group: format!("{} + {}", labels[0], labels[1]),
                required: 3,
                actual: idx[0].len() + idx[1].len(),
            });
        }

        let g = set.n_features();
        let mut mean = [Array1::<f64>::zeros(g), Array1::<f64>::zeros(g)];
        let mut ss = [Array1::<f64>::zeros(g), Array1::<f64>::zeros(g)];

        for f in 0..g {
            let values = set.feature(f);
            for k in 0..2 {
                let n = idx[k].len() as f64;
                let m = idx[k].iter().map(|&s| values[s]).sum::<f64>() / n;
                mean[k][f] = m;
                ss[k][f] = idx[k].iter().map(|&s| (values[s] - m).powi(2)).sum();
            }
        }

        let [mean0, mean1] = mean;
        let [ss0, ss1] = ss;
        Ok(Self {
            sizes: (idx[0].len(), idx[1].len()),
            mean0,
            mean1,
            ss0,
            ss1,
        })
    }

    /// Mean difference, group 1 minus group 0
    pub fn effects(&self) -> Array1<f64> {
        &self.mean1 - &self.mean0
    }

    /// Overall means
    pub fn averages(&self) -> Array1<f64> {
        let (n0, n1) = (self.sizes.0 as f64, self.sizes.1 as f64);
        (&self.mean0 * n0 + &self.mean1 * n1) / (n0 + n1)
    }

    /// Residual df of the two-group linear model
    pub const fn residual_df(&self) -> usize {
        self.sizes.0 + self.sizes.1 - 2
    }

    /// Pooled residual variances s²
    pub fn pooled_variances(&self) -> Array1<f64> {
        (&self.ss0 + &self.ss1) / self.residual_df() as f64
    }

    /// `√(1/n₀ + 1/n₁)`
    pub fn unscaled_se(&self) -> f64 {
        (1.0 / self.sizes.0 as f64 + 1.0 / self.sizes.1 as f64).sqrt()
    }
}

/// Two-sample t test of every feature in `set`
///
/// A feature with no within-group variation gets a NaN statistic and
/// p-value and is left out of any later adjustment. Fails with
/// [`TestingError::DegenerateVariance`] only when no feature can be tested.
pub fn two_sample_t_test(set: &ExpressionSet, variant: TTestVariant) -> Result<TestTable> {
    let moments = GroupMoments::from_set(set)?;
    let (n0, n1) = moments.sizes;

    if variant == TTestVariant::Welch {
        let labels = set.group_labels();
        for (group, n) in [n0, n1].into_iter().enumerate() {
            if n < 2 {
                return Err(TestingError::InsufficientReplicates {
                    group: labels[group].clone(),
                    required: 2,
                    actual: n,
                });
            }
        }
    }

    let effects = moments.effects();
    let averages = moments.averages();
    let pooled = moments.pooled_variances();
    let pooled_df = moments.residual_df() as f64;

    let mut rows = Vec::with_capacity(set.n_features());
    let mut degenerate = Vec::new();
    for (f, feature) in set.feature_names().iter().enumerate() {
        let (se, df) = match variant {
            TTestVariant::Pooled => (pooled[f].sqrt() * moments.unscaled_se(), pooled_df),
            TTestVariant::Welch => {
                let a = moments.ss0[f] / (n0 - 1) as f64 / n0 as f64;
                let b = moments.ss1[f] / (n1 - 1) as f64 / n1 as f64;
                let df = (a + b).powi(2) / (a * a / (n0 - 1) as f64 + b * b / (n1 - 1) as f64);
                ((a + b).sqrt(), df)
            }
        };

        let (statistic, p_value) = if se.is_nan() || se <= 0.0 {
            degenerate.push(feature.as_str());
            (f64::NAN, f64::NAN)
        } else {
            let statistic = effects[f] / se;
            let dist = StudentsT::new(0.0, 1.0, df)
                .map_err(|e| TestingError::InvalidParameter(format!("t distribution: {e}")))?;
            (statistic, (2.0 * dist.sf(statistic.abs())).min(1.0))
        };

        rows.push(TestRow {
            feature: feature.clone(),
            effect: effects[f],
            average: averages[f],
            statistic,
            df,
            p_value,
            adjusted_p_value: p_value,
        });
    }

    if !degenerate.is_empty() {
        if degenerate.len() == rows.len() {
            return Err(TestingError::DegenerateVariance(
                "every feature has zero within-group variance".to_string(),
            ));
        }
        log::warn!(
            "{} feature(s) with zero within-group variance left untested (first: {})",
            degenerate.len(),
            degenerate[0]
        );
    }

    let name = match variant {
        TTestVariant::Pooled => "t-test (pooled)",
        TTestVariant::Welch => "t-test (Welch)",
    };
    log::debug!("{name}: {} features, {n0} vs {n1} samples", rows.len());
    Ok(TestTable::new(name, rows))
}
