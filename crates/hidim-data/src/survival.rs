//! Right-censored survival responses.

use crate::error::{DataError, Result};
use crate::frame;
use ndarray::{Array1, Axis};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Observed follow-up time and event indicator per observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalResponse {
    time: Array1<f64>,
    event: Vec<bool>,
}

impl SurvivalResponse {
    /// Pair times with event indicators (`true` = event observed, `false` = censored).
    pub fn new(time: Array1<f64>, event: Vec<bool>) -> Result<Self> {
        if time.len() != event.len() {
            return Err(DataError::DimensionMismatch {
                expected: time.len(),
                actual: event.len(),
            });
        }
        if let Some(bad) = time.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(DataError::InvalidParameter(format!(
                "survival times must be finite and non-negative, got {bad}"
            )));
        }
        Ok(Self { time, event })
    }

    /// Read time and status columns; status is non-zero for an event.
    pub fn from_dataframe(df: &DataFrame, time: &str, status: &str) -> Result<Self> {
        let time = frame::numeric_column(df, time)?;
        let event = frame::numeric_column(df, status)?
            .iter()
            .map(|&s| s != 0.0)
            .collect();
        Self::new(time, event)
    }

    /// Follow-up times
    pub const fn time(&self) -> &Array1<f64> {
        &self.time
    }

    /// Event indicators
    pub fn event(&self) -> &[bool] {
        &self.event
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether there are no observations
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of observed events
    pub fn n_events(&self) -> usize {
        self.event.iter().filter(|&&e| e).count()
    }

    /// Subset of observations, in the given order
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            time: self.time.select(Axis(0), rows),
            event: rows.iter().map(|&r| self.event[r]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use polars::prelude::df;

    #[test]
    fn test_length_mismatch() {
        assert!(SurvivalResponse::new(array![1.0, 2.0], vec![true]).is_err());
    }

    #[test]
    fn test_negative_time_rejected() {
        assert!(SurvivalResponse::new(array![-1.0], vec![true]).is_err());
    }

    #[test]
    fn test_from_dataframe() {
        let df = df!("time" => [5.0, 3.0, 9.0], "status" => [1i64, 0, 1]).unwrap();
        let response = SurvivalResponse::from_dataframe(&df, "time", "status").unwrap();

        assert_eq!(response.len(), 3);
        assert_eq!(response.n_events(), 2);
        assert_eq!(response.event(), &[true, false, true]);

        let subset = response.select(&[2, 1]);
        assert_eq!(subset.time().to_vec(), vec![9.0, 3.0]);
        assert_eq!(subset.event(), &[true, false]);
    }
}
