//! Gene-expression matrices with a two-group phenotype.
//!
//! Values are stored features x samples, the orientation expression data
//! usually arrives in: one row per gene, one column per sample.

use crate::error::{DataError, Result};
use crate::frame;
use ndarray::{Array2, ArrayView1};
use polars::prelude::DataFrame;
use std::path::Path;

/// Expression values and the group membership of each sample
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionSet {
    feature_names: Vec<String>,
    values: Array2<f64>,
    groups: Vec<usize>,
    group_labels: [String; 2],
}

impl ExpressionSet {
    /// Build from a features x samples matrix and one label per sample.
    ///
    /// Exactly two distinct labels are required. The first label seen becomes
    /// group 0 (the reference), unless `reference` names the other one.
    pub fn new(
        values: Array2<f64>,
        feature_names: Vec<String>,
        labels: &[String],
        reference: Option<&str>,
    ) -> Result<Self> {
        let (n_features, n_samples) = values.dim();
        if feature_names.len() != n_features {
            return Err(DataError::DimensionMismatch {
                expected: n_features,
                actual: feature_names.len(),
            });
        }
        if labels.len() != n_samples {
            return Err(DataError::DimensionMismatch {
                expected: n_samples,
                actual: labels.len(),
            });
        }

        let mut distinct: Vec<&String> = Vec::new();
        for label in labels {
            if !distinct.contains(&label) {
                distinct.push(label);
            }
        }
        if distinct.len() != 2 {
            return Err(DataError::InvalidParameter(format!(
                "expected exactly two groups, found {}",
                distinct.len()
            )));
        }

        let mut group_labels = [distinct[0].clone(), distinct[1].clone()];
        if let Some(reference) = reference {
            if group_labels[1] == reference {
                group_labels.swap(0, 1);
            } else if group_labels[0] != reference {
                return Err(DataError::InvalidParameter(format!(
                    "reference group {reference} not among the labels"
                )));
            }
        }

        let groups = labels
            .iter()
            .map(|l| usize::from(*l != group_labels[0]))
            .collect();

        Ok(Self {
            feature_names,
            values,
            groups,
            group_labels,
        })
    }

    /// Read a CSV whose first column holds feature names and whose remaining
    /// columns are samples.
    pub fn from_dataframe(
        df: &DataFrame,
        labels: &[String],
        reference: Option<&str>,
    ) -> Result<Self> {
        let names = frame::column_names(df);
        let Some((id_column, sample_columns)) = names.split_first() else {
            return Err(DataError::EmptyData("expression table has no columns".to_string()));
        };
        if sample_columns.is_empty() {
            return Err(DataError::EmptyData("expression table has no sample columns".to_string()));
        }

        let feature_names = frame::text_column(df, id_column)?;
        let mut values = Array2::<f64>::zeros((df.height(), sample_columns.len()));
        for (j, sample) in sample_columns.iter().enumerate() {
            values.column_mut(j).assign(&frame::numeric_column(df, sample)?);
        }

        Self::new(values, feature_names, labels, reference)
    }

    /// Load from CSV; see [`ExpressionSet::from_dataframe`]
    pub fn from_csv(path: &Path, labels: &[String], reference: Option<&str>) -> Result<Self> {
        let df = frame::read_csv(path)?;
        Self::from_dataframe(&df, labels, reference)
    }

    /// Number of features (genes)
    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Features x samples values
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Feature names
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Group index (0 or 1) of each sample
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    /// Labels of group 0 and group 1
    pub const fn group_labels(&self) -> &[String; 2] {
        &self.group_labels
    }

    /// Sample indices belonging to `group`
    pub fn group_indices(&self, group: usize) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|&(_, &g)| g == group)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of samples in each group
    pub fn group_sizes(&self) -> (usize, usize) {
        let n1 = self.groups.iter().filter(|&&g| g == 1).count();
        (self.groups.len() - n1, n1)
    }

    /// Values of one feature across samples
    pub fn feature(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// `log2(value + offset)` transform, as usually applied to raw intensities
    pub fn log2_transform(&self, offset: f64) -> Result<Self> {
        if let Some(bad) = self.values.iter().find(|&&v| v + offset <= 0.0) {
            return Err(DataError::InvalidParameter(format!(
                "cannot take log2 of {bad} with offset {offset}"
            )));
        }
        Ok(Self {
            values: self.values.mapv(|v| (v + offset).log2()),
            ..self.clone()
        })
    }

    /// Transpose into a samples x features matrix for regression use
    pub fn samples_by_features(&self) -> Array2<f64> {
        self.values.t().to_owned()
    }
}
