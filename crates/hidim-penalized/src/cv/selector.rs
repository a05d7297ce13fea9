//! K-fold cross-validation over a penalty path

use super::folds::FoldAssignment;
use super::loss::ValidationLoss;
use crate::engine::PenalizedFit;
use crate::error::{PenalizedError, Result};
use crate::path::PenaltyPath;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// How the penalty is chosen from the CV curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRule {
    /// Penalty with the smallest mean error
    #[default]
    Minimum,
    /// Largest penalty whose mean error is within one standard error of the
    /// minimum
    OneStandardError,
}

/// Cross-validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossValidationConfig {
    /// Number of folds K
    pub folds: usize,

    /// Selection rule
    pub rule: SelectionRule,

    /// Held-out loss
    pub loss: ValidationLoss,

    /// Seed for the random fold assignment
    pub seed: u64,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            rule: SelectionRule::default(),
            loss: ValidationLoss::default(),
            seed: 42,
        }
    }
}

/// What happened to one fold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStatus {
    /// Errors recorded for the path
    Scored,
    /// Excluded from the curve
    Skipped,
}

/// Outcome of a cross-validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationResult {
    /// Penalty path shared by all folds
    pub lambdas: PenaltyPath,
    /// Fold × λ error matrix; NaN marks an excluded entry
    pub fold_errors: Array2<f64>,
    /// Mean error per λ over contributing folds
    pub mean_error: Array1<f64>,
    /// Standard error of the mean per λ; NaN with fewer than two folds
    pub standard_error: Array1<f64>,
    /// Contributing folds per λ
    pub n_contributing: Vec<usize>,
    /// Index of the minimum-error penalty
    pub index_min: usize,
    /// Index of the one-standard-error penalty
    pub index_1se: usize,
    /// Rule used by [`Self::selected_index`]
    pub rule: SelectionRule,
    /// Folds excluded entirely
    pub skipped_folds: Vec<usize>,
    /// Loss name
    pub loss: String,
}

impl CrossValidationResult {
    /// Penalty with the smallest mean error
    pub fn lambda_min(&self) -> f64 {
        self.lambdas.values()[self.index_min]
    }

    /// Largest penalty within one standard error of the minimum
    pub fn lambda_1se(&self) -> f64 {
        self.lambdas.values()[self.index_1se]
    }

    /// Path index chosen by the configured rule
    pub const fn selected_index(&self) -> usize {
        match self.rule {
            SelectionRule::Minimum => self.index_min,
            SelectionRule::OneStandardError => self.index_1se,
        }
    }

    /// Penalty chosen by the configured rule
    pub fn selected_lambda(&self) -> f64 {
        self.lambdas.values()[self.selected_index()]
    }

    /// Number of folds
    pub fn n_folds(&self) -> usize {
        self.fold_errors.nrows()
    }
}

/// Cross-validated penalty selection
#[derive(Debug, Default)]
pub struct CrossValidation {
    config: CrossValidationConfig,
}

impl CrossValidation {
    /// Create a new selector
    pub const fn new(config: CrossValidationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub const fn config(&self) -> &CrossValidationConfig {
        &self.config
    }

    /// Cross-validate `engine` on its default path with random folds
    pub fn run<E: PenalizedFit + ?Sized>(
        &self,
        engine: &E,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<CrossValidationResult> {
        let path = engine.default_path(x, y)?;
        let folds = FoldAssignment::random(x.nrows(), self.config.folds, self.config.seed)?;
        self.run_observed(engine, x, y, &path, &folds, |_, _| {})
    }

    /// Cross-validate on an explicit path and fold assignment, reporting
    /// each finished fold to `on_fold`
    pub fn run_observed<E, F>(
        &self,
        engine: &E,
        x: &Array2<f64>,
        y: &Array1<f64>,
        path: &PenaltyPath,
        folds: &FoldAssignment,
        mut on_fold: F,
    ) -> Result<CrossValidationResult>
    where
        E: PenalizedFit + ?Sized,
        F: FnMut(usize, FoldStatus),
    {
        let n = x.nrows();
        if y.len() != n {
            return Err(PenalizedError::DimensionMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        if folds.len() != n {
            return Err(PenalizedError::DimensionMismatch {
                expected: n,
                actual: folds.len(),
            });
        }
        if let ValidationLoss::Concordance(events) = &self.config.loss {
            if events.len() != n {
                return Err(PenalizedError::DimensionMismatch {
                    expected: n,
                    actual: events.len(),
                });
            }
        }

        let k = folds.n_folds();
        let mut fold_errors = Array2::<f64>::from_elem((k, path.len()), f64::NAN);
        let mut skipped_folds = Vec::new();

        for fold in 0..k {
            let errors = fold_errors.row_mut(fold);
            let status = self.score_fold(engine, x, y, path, folds, fold, errors);
            if status == FoldStatus::Skipped {
                skipped_folds.push(fold);
            }
            on_fold(fold, status);
        }

        let (mean_error, standard_error, n_contributing) = summarize(&fold_errors);

        let index_min = mean_error
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_finite())
            .fold(None, |best: Option<(usize, f64)>, (i, &m)| match best {
                Some((_, b)) if b <= m => best,
                _ => Some((i, m)),
            })
            .map(|(i, _)| i)
            .ok_or(PenalizedError::NoValidFolds)?;

        let se_min = standard_error[index_min];
        let bound = mean_error[index_min] + if se_min.is_finite() { se_min } else { 0.0 };
        let index_1se = mean_error
            .iter()
            .position(|&m| m.is_finite() && m <= bound)
            .unwrap_or(index_min);

        let result = CrossValidationResult {
            lambdas: path.clone(),
            fold_errors,
            mean_error,
            standard_error,
            n_contributing,
            index_min,
            index_1se,
            rule: self.config.rule,
            skipped_folds,
            loss: self.config.loss.name().to_string(),
        };

        log::info!(
            "{k}-fold CV ({}): lambda_min = {:.4e} (error {:.4e}), lambda_1se = {:.4e}, {} fold(s) skipped",
            result.loss,
            result.lambda_min(),
            result.mean_error[index_min],
            result.lambda_1se(),
            result.skipped_folds.len()
        );

        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn score_fold<E: PenalizedFit + ?Sized>(
        &self,
        engine: &E,
        x: &Array2<f64>,
        y: &Array1<f64>,
        path: &PenaltyPath,
        folds: &FoldAssignment,
        fold: usize,
        mut errors: ndarray::ArrayViewMut1<'_, f64>,
    ) -> FoldStatus {
        let test = folds.test_indices(fold);
        let train = folds.train_indices(fold);

        let y_test = y.select(Axis(0), &test);
        let y_train = y.select(Axis(0), &train);

        if test.len() >= 2 && is_constant(&y_test) {
            log::warn!("Skipping fold {fold}: held-out response has zero variance");
            return FoldStatus::Skipped;
        }
        if is_constant(&y_train) {
            log::warn!("Skipping fold {fold}: training response has zero variance");
            return FoldStatus::Skipped;
        }

        let x_train = x.select(Axis(0), &train);
        let x_test = x.select(Axis(0), &test);

        let predictions = match engine
            .fit_path(&x_train, &y_train, path)
            .and_then(|fit| fit.predict_all(&x_test))
        {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Skipping fold {fold}: fit failed ({e})");
                return FoldStatus::Skipped;
            }
        };

        for (l, column) in predictions.axis_iter(Axis(1)).enumerate() {
            let error = self.config.loss.evaluate(y_test.view(), column, &test);
            errors[l] = if error.is_finite() { error } else { f64::NAN };
        }

        log::debug!("Fold {fold}: {} held out, {} training", test.len(), train.len());
        FoldStatus::Scored
    }
}

fn is_constant(values: &Array1<f64>) -> bool {
    let Some(&first) = values.first() else {
        return true;
    };
    let scale = first.abs().max(1.0);
    values.iter().all(|v| (v - first).abs() <= 1e-12 * scale)
}

/// Mean, standard error and count over the finite entries of each column
fn summarize(fold_errors: &Array2<f64>) -> (Array1<f64>, Array1<f64>, Vec<usize>) {
    let n_lambda = fold_errors.ncols();
    let mut mean = Array1::<f64>::from_elem(n_lambda, f64::NAN);
    let mut se = Array1::<f64>::from_elem(n_lambda, f64::NAN);
    let mut counts = vec![0; n_lambda];

    for (l, column) in fold_errors.axis_iter(Axis(1)).enumerate() {
        let values: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
        let count = values.len();
        counts[l] = count;
        if count == 0 {
            continue;
        }
        let m = values.iter().sum::<f64>() / count as f64;
        mean[l] = m;
        if count >= 2 {
            let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (count - 1) as f64;
            se[l] = (var / count as f64).sqrt();
        }
    }

    (mean, se, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elastic_net::ElasticNet;
    use crate::ridge::RidgeSolver;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| {
            ((i * 7 + j * 3) % 11) as f64 - 5.0 + 0.1 * j as f64
        });
        let y = x.column(0).mapv(|v| 2.0 * v) + x.column(1).mapv(|v| 0.5 * v)
            + Array1::from_shape_fn(n, |i| ((i * 13) % 5) as f64 * 0.1);
        (x, y)
    }

    #[test]
    fn test_summarize_ignores_nan() {
        let errors = array![[1.0, f64::NAN], [3.0, 2.0], [f64::NAN, f64::NAN]];
        let (mean, se, counts) = summarize(&errors);

        assert_abs_diff_eq!(mean[0], 2.0);
        assert_abs_diff_eq!(se[0], (2.0_f64 / 2.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(mean[1], 2.0);
        assert!(se[1].is_nan());
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn test_curve_is_unweighted_fold_average() {
        let (x, y) = linear_data(30);
        let engine = RidgeSolver::default();
        let path = PenaltyPath::new(vec![10.0, 1.0, 0.1]).unwrap();
        let folds = FoldAssignment::sequential(30, 3).unwrap();

        let result = CrossValidation::default()
            .run_observed(&engine, &x, &y, &path, &folds, |_, _| {})
            .unwrap();

        for l in 0..path.len() {
            let expected = result.fold_errors.column(l).sum() / 3.0;
            assert_abs_diff_eq!(result.mean_error[l], expected, epsilon = 1e-12);
            assert_eq!(result.n_contributing[l], 3);
        }
        assert!(result.skipped_folds.is_empty());
    }

    #[test]
    fn test_one_se_rule_prefers_larger_penalty() {
        let (x, y) = linear_data(40);
        let config = CrossValidationConfig {
            folds: 5,
            rule: SelectionRule::OneStandardError,
            ..Default::default()
        };

        let result = CrossValidation::new(config).run(&ElasticNet::lasso(), &x, &y).unwrap();

        assert!(result.index_1se <= result.index_min);
        assert!(result.lambda_1se() >= result.lambda_min());
        assert_eq!(result.selected_index(), result.index_1se);
        let bound = result.mean_error[result.index_min] + result.standard_error[result.index_min];
        assert!(result.mean_error[result.index_1se] <= bound);
    }

    #[test]
    fn test_degenerate_fold_is_skipped() {
        // The first fold holds a constant response
        let x = Array2::from_shape_fn((9, 2), |(i, j)| {
            (i + 2 * j) as f64 + if i % 2 == 0 { 0.3 } else { -0.3 }
        });
        let y = array![1.0, 1.0, 1.0, 2.0, 5.0, 3.0, 8.0, 4.0, 7.0];
        let path = PenaltyPath::new(vec![1.0, 0.1]).unwrap();
        let folds = FoldAssignment::sequential(9, 3).unwrap();

        let mut observed = Vec::new();
        let result = CrossValidation::default()
            .run_observed(&RidgeSolver::default(), &x, &y, &path, &folds, |fold, status| {
                observed.push((fold, status));
            })
            .unwrap();

        assert_eq!(result.skipped_folds, vec![0]);
        assert!(result.fold_errors.row(0).iter().all(|v| v.is_nan()));
        assert_eq!(result.n_contributing, vec![2, 2]);
        assert_eq!(observed[0], (0, FoldStatus::Skipped));
        assert_eq!(observed.len(), 3);
    }

    #[test]
    fn test_no_valid_folds() {
        let x = Array2::from_shape_fn((4, 1), |(i, _)| i as f64);
        let y = array![1.0, 1.0, 2.0, 2.0];
        let path = PenaltyPath::single(1.0).unwrap();
        let folds = FoldAssignment::sequential(4, 2).unwrap();

        let result = CrossValidation::default().run_observed(
            &RidgeSolver::default(),
            &x,
            &y,
            &path,
            &folds,
            |_, _| {},
        );
        assert!(matches!(result, Err(PenalizedError::NoValidFolds)));
    }

    #[test]
    fn test_fold_count_validated() {
        let (x, y) = linear_data(5);
        let config = CrossValidationConfig {
            folds: 6,
            ..Default::default()
        };
        assert!(matches!(
            CrossValidation::new(config).run(&RidgeSolver::default(), &x, &y),
            Err(PenalizedError::InvalidParameter(_))
        ));
    }
}
