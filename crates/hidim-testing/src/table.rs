//! Per-feature test results

use crate::adjust::{AdjustmentMethod, adjust_p_values};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One tested feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRow {
    /// Feature name
    pub feature: String,
    /// Mean of group 1 minus mean of group 0
    pub effect: f64,
    /// Mean over all samples
    pub average: f64,
    /// Test statistic
    pub statistic: f64,
    /// Degrees of freedom of the reference distribution (may be infinite)
    pub df: f64,
    /// Raw two-sided p-value
    pub p_value: f64,
    /// Adjusted p-value
    pub adjusted_p_value: f64,
}

/// Test results for every feature, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTable {
    /// Name of the test that produced the statistics
    pub test: String,
    /// Adjustment applied to `adjusted_p_value`
    pub adjustment: AdjustmentMethod,
    rows: Vec<TestRow>,
}

impl TestTable {
    /// Wrap unadjusted rows; adjusted p-values start equal to the raw ones
    pub fn new(test: impl Into<String>, mut rows: Vec<TestRow>) -> Self {
        for row in &mut rows {
            row.adjusted_p_value = row.p_value;
        }
        Self {
            test: test.into(),
            adjustment: AdjustmentMethod::None,
            rows,
        }
    }

    /// Recompute adjusted p-values with `method`
    ///
    /// Untested rows (NaN p-value) keep a NaN adjusted p-value and do not
    /// count towards the number of tests.
    pub fn adjust(mut self, method: AdjustmentMethod) -> Result<Self> {
        let tested: Vec<usize> = (0..self.rows.len())
            .filter(|&i| !self.rows[i].p_value.is_nan())
            .collect();
        let p_values: Vec<f64> = tested.iter().map(|&i| self.rows[i].p_value).collect();
        let adjusted = adjust_p_values(&p_values, method)?;

        for row in &mut self.rows {
            row.adjusted_p_value = f64::NAN;
        }
        for (&i, p) in tested.iter().zip(adjusted) {
            self.rows[i].adjusted_p_value = p;
        }
        self.adjustment = method;
        Ok(self)
    }

    /// Rows in input order
    pub fn rows(&self) -> &[TestRow] {
        &self.rows
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no feature was tested
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw p-values in input order
    pub fn p_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.p_value).collect()
    }

    /// The `n` rows with the smallest raw p-values
    pub fn top(&self, n: usize) -> Vec<&TestRow> {
        let mut sorted: Vec<&TestRow> = self.rows.iter().collect();
        sorted.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
        sorted.truncate(n);
        sorted
    }

    /// Rows whose adjusted p-value is at most `level`
    pub fn significant(&self, level: f64) -> Vec<&TestRow> {
        self.rows.iter().filter(|r| r.adjusted_p_value <= level).collect()
    }

    /// Number of rows with raw p-value at most `level`
    pub fn n_raw_below(&self, level: f64) -> usize {
        self.rows.iter().filter(|r| r.p_value <= level).count()
    }
}
