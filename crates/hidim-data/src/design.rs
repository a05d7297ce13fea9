//! Design matrix assembly
//!
//! A [`Design`] pairs an n x p observation matrix with a length-n response
//! and the feature names, and optionally remembers the centring/scaling that
//! was applied so fitted coefficients can be mapped back to the original
//! units.

use crate::error::{DataError, Result};
use crate::frame;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column transformation applied before fitting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandardizeConfig {
    /// Subtract the column mean
    pub center: bool,

    /// Divide by the column standard deviation (population, 1/n)
    pub scale: bool,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            center: true,
            scale: true,
        }
    }
}

/// Per-column means and scales recorded by [`Design::standardize`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Standardization {
    /// Column means (zeros when not centred)
    pub means: Array1<f64>,
    /// Column scales (ones when not scaled, or for constant columns)
    pub scales: Array1<f64>,
}

impl Standardization {
    /// Compute column statistics for `x`
    pub fn fit(x: &Array2<f64>, config: &StandardizeConfig) -> Self {
        let (n, p) = x.dim();
        let means = if config.center && n > 0 {
            x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p))
        } else {
            Array1::zeros(p)
        };

        let mut scales = Array1::<f64>::ones(p);
        if config.scale && n > 0 {
            for (j, column) in x.axis_iter(Axis(1)).enumerate() {
                let mean = column.sum() / n as f64;
                let variance = column.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n as f64;
                let sd = variance.sqrt();
                if sd > 1e-12 {
                    scales[j] = sd;
                } else {
                    log::warn!("Column {j} has zero variance; leaving it unscaled");
                }
            }
        }

        Self { means, scales }
    }

    /// Apply the recorded transformation to a matrix with the same columns
    pub fn apply(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.means.len() {
            return Err(DataError::DimensionMismatch {
                expected: self.means.len(),
                actual: x.ncols(),
            });
        }
        let centered = x - &self.means.view().insert_axis(Axis(0));
        Ok(centered / &self.scales.view().insert_axis(Axis(0)))
    }

    /// Map coefficients fitted on the standardized scale back to the
    /// original units.
    ///
    /// Returns `(coefficients, intercept)`.
    pub fn to_original_scale(
        &self,
        coefficients: &Array1<f64>,
        intercept: f64,
    ) -> (Array1<f64>, f64) {
        let original = coefficients / &self.scales;
        let shift = original.dot(&self.means);
        (original, intercept - shift)
    }
}

/// Observation matrix, response and feature names
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    feature_names: Vec<String>,
    x: Array2<f64>,
    y: Array1<f64>,
    standardization: Option<Standardization>,
}

impl Design {
    /// Assemble a design from raw arrays.
    ///
    /// # Errors
    /// Fails if the number of rows, response length and name count disagree,
    /// or if any entry is non-finite.
    pub fn new(x: Array2<f64>, y: Array1<f64>, feature_names: Vec<String>) -> Result<Self> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(DataError::DimensionMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        if feature_names.len() != p {
            return Err(DataError::DimensionMismatch {
                expected: p,
                actual: feature_names.len(),
            });
        }
        if n == 0 || p == 0 {
            return Err(DataError::EmptyData(format!(
                "design must have at least one row and one column, got {n} x {p}"
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(DataError::InvalidParameter(
                "design contains non-finite values".to_string(),
            ));
        }

        Ok(Self {
            feature_names,
            x,
            y,
            standardization: None,
        })
    }

    /// Assemble a design with generated feature names `x1..xp`
    pub fn from_arrays(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        let names = (1..=x.ncols()).map(|j| format!("x{j}")).collect();
        Self::new(x, y, names)
    }

    /// Build a design from a data frame.
    ///
    /// `features` selects the predictor columns; when `None`, every numeric
    /// column except the response is used and text columns (sample ids,
    /// labels) are skipped.
    pub fn from_dataframe(
        df: &DataFrame,
        response: &str,
        features: Option<&[String]>,
    ) -> Result<Self> {
        let y = frame::numeric_column(df, response)?;

        let selected: Vec<String> = match features {
            Some(names) => names.to_vec(),
            None => {
                let mut names = Vec::new();
                for name in frame::column_names(df) {
                    if name == response {
                        continue;
                    }
                    if frame::is_text_column(df, &name)? {
                        log::debug!("Skipping text column {name}");
                        continue;
                    }
                    names.push(name);
                }
                names
            }
        };

        if selected.is_empty() {
            return Err(DataError::EmptyData("no feature columns selected".to_string()));
        }

        let n = df.height();
        let mut x = Array2::<f64>::zeros((n, selected.len()));
        for (j, name) in selected.iter().enumerate() {
            x.column_mut(j).assign(&frame::numeric_column(df, name)?);
        }

        Self::new(x, y, selected)
    }

    /// Load a design from a CSV file with a header row
    pub fn from_csv(path: &Path, response: &str, features: Option<&[String]>) -> Result<Self> {
        let df = frame::read_csv(path)?;
        Self::from_dataframe(&df, response, features)
    }

    /// Number of observations (rows)
    pub fn n_observations(&self) -> usize {
        self.x.nrows()
    }

    /// Number of features (columns)
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Observation matrix
    pub const fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Response vector
    pub const fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Feature names, one per column
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Transformation applied by [`Design::standardize`], if any
    pub const fn standardization(&self) -> Option<&Standardization> {
        self.standardization.as_ref()
    }

    /// Whether p > n
    pub fn is_high_dimensional(&self) -> bool {
        self.n_features() > self.n_observations()
    }

    /// Return a standardized copy; the response is left untouched.
    pub fn standardize(&self, config: &StandardizeConfig) -> Result<Self> {
        let standardization = Standardization::fit(&self.x, config);
        let x = standardization.apply(&self.x)?;
        Ok(Self {
            feature_names: self.feature_names.clone(),
            x,
            y: self.y.clone(),
            standardization: Some(standardization),
        })
    }

    /// Subset of rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_observations()) {
            return Err(DataError::InvalidParameter(format!(
                "row index {bad} out of range for {} observations",
                self.n_observations()
            )));
        }
        Ok(Self {
            feature_names: self.feature_names.clone(),
            x: self.x.select(Axis(0), rows),
            y: self.y.select(Axis(0), rows),
            standardization: self.standardization.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use polars::prelude::df;
    use rstest::rstest;

    fn small_design() -> Design {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        Design::from_arrays(x, y).unwrap()
    }

    #[test]
    fn test_dimension_checks() {
        let x = Array2::<f64>::zeros((3, 2));
        let y = Array1::<f64>::zeros(4);
        assert!(matches!(
            Design::from_arrays(x, y),
            Err(DataError::DimensionMismatch { expected: 3, actual: 4 })
        ));
    }

    #[rstest]
    #[case(f64::NAN, 2.0)]
    #[case(f64::INFINITY, 2.0)]
    #[case(1.0, f64::NEG_INFINITY)]
    #[case(1.0, f64::NAN)]
    fn test_rejects_non_finite(#[case] feature: f64, #[case] response: f64) {
        let x = array![[1.0], [feature]];
        let y = array![1.0, response];
        assert!(Design::from_arrays(x, y).is_err());
    }

    #[test]
    fn test_standardize_centers_and_scales() {
        let design = small_design().standardize(&StandardizeConfig::default()).unwrap();

        for column in design.x().axis_iter(Axis(1)) {
            let mean = column.sum() / 4.0;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(var, 1.0, epsilon = 1e-12);
        }
        assert_eq!(design.y(), small_design().y());
    }

    #[test]
    fn test_constant_column_left_unscaled() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let y = array![0.0, 1.0, 2.0];
        let design = Design::from_arrays(x, y).unwrap();
        let standardized = design.standardize(&StandardizeConfig::default()).unwrap();

        let s = standardized.standardization().unwrap();
        assert_eq!(s.scales[1], 1.0);
        assert!(standardized.x().column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_back_transform_coefficients() {
        let design = small_design();
        let s = Standardization::fit(design.x(), &StandardizeConfig::default());

        // y = 1 * x1 exactly; on the standardized scale beta = sd(x1), intercept = mean(y)
        let sd = s.scales[0];
        let (coef, intercept) = s.to_original_scale(&array![sd, 0.0], 2.5);

        assert_abs_diff_eq!(coef[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(coef[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(intercept, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_select_rows() {
        let subset = small_design().select_rows(&[3, 0]).unwrap();
        assert_eq!(subset.n_observations(), 2);
        assert_eq!(subset.y().to_vec(), vec![4.0, 1.0]);
        assert!(small_design().select_rows(&[4]).is_err());
    }

    #[test]
    fn test_from_dataframe_skips_text_columns() {
        let df = df!(
            "id" => ["a", "b", "c"],
            "lpsa" => [1.0, 2.0, 3.0],
            "lcavol" => [0.5, 0.1, 0.9],
            "age" => [60i64, 65, 70]
        )
        .unwrap();

        let design = Design::from_dataframe(&df, "lpsa", None).unwrap();
        assert_eq!(design.feature_names(), &["lcavol".to_string(), "age".to_string()]);
        assert_eq!(design.x()[[2, 1]], 70.0);
    }

    #[test]
    fn test_from_dataframe_explicit_features() {
        let df = df!("y" => [1.0, 2.0], "a" => [3.0, 4.0], "b" => [5.0, 6.0]).unwrap();

        let design = Design::from_dataframe(&df, "y", Some(&["b".to_string()])).unwrap();
        assert_eq!(design.n_features(), 1);
        assert_eq!(design.x()[[1, 0]], 6.0);
    }
}
