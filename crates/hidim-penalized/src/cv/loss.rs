//! Held-out validation losses

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Loss used to score held-out predictions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ValidationLoss {
    /// Mean squared prediction error
    #[default]
    MeanSquaredError,

    /// Mean absolute prediction error
    MeanAbsoluteError,

    /// 1 − Harrell's C. The response is the follow-up time and the vector
    /// holds the event indicator of every observation (`false` = censored).
    /// A higher prediction means longer survival.
    Concordance(Vec<bool>),
}

impl ValidationLoss {
    /// Short name for tables and logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MeanSquaredError => "mse",
            Self::MeanAbsoluteError => "mae",
            Self::Concordance(_) => "1-C",
        }
    }

    /// Loss of `predicted` against `observed` for the observations `rows`
    /// of the full data set. May be NaN (e.g. no comparable pairs).
    pub fn evaluate(
        &self,
        observed: ArrayView1<'_, f64>,
        predicted: ArrayView1<'_, f64>,
        rows: &[usize],
    ) -> f64 {
        let n = observed.len();
        if n == 0 {
            return f64::NAN;
        }
        match self {
            Self::MeanSquaredError => {
                observed
                    .iter()
                    .zip(predicted.iter())
                    .map(|(o, p)| (o - p).powi(2))
                    .sum::<f64>()
                    / n as f64
            }
            Self::MeanAbsoluteError => {
                observed
                    .iter()
                    .zip(predicted.iter())
                    .map(|(o, p)| (o - p).abs())
                    .sum::<f64>()
                    / n as f64
            }
            Self::Concordance(events) => {
                let held_out: Vec<bool> = rows
                    .iter()
                    .map(|&r| events.get(r).copied().unwrap_or(false))
                    .collect();
                1.0 - concordance_index(observed, predicted, &held_out)
            }
        }
    }
}

/// Harrell's concordance index
///
/// A pair (i, j) is comparable when `time[i] < time[j]` and i had an event.
/// It is concordant when `predicted[i] < predicted[j]`; tied predictions
/// count one half. Returns NaN when no pair is comparable.
pub fn concordance_index(
    time: ArrayView1<'_, f64>,
    predicted: ArrayView1<'_, f64>,
    event: &[bool],
) -> f64 {
    let n = time.len();
    let mut comparable = 0.0;
    let mut concordant = 0.0;

    for i in 0..n {
        if !event[i] {
            continue;
        }
        for j in 0..n {
            if time[i] < time[j] {
                comparable += 1.0;
                if predicted[i] < predicted[j] {
                    concordant += 1.0;
                } else if predicted[i] == predicted[j] {
                    concordant += 0.5;
                }
            }
        }
    }

    if comparable == 0.0 { f64::NAN } else { concordant / comparable }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_mse_and_mae() {
        let observed = array![1.0, 2.0, 3.0];
        let predicted = array![1.5, 2.0, 1.0];

        let (observed, predicted, rows) = (observed.view(), predicted.view(), [0, 1, 2]);
        let mse = ValidationLoss::MeanSquaredError.evaluate(observed, predicted, &rows);
        let mae = ValidationLoss::MeanAbsoluteError.evaluate(observed, predicted, &rows);

        assert_abs_diff_eq!(mse, (0.25 + 4.0) / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mae, 2.5 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_concordance_perfect_and_reversed() {
        let time = array![1.0, 2.0, 3.0, 4.0];
        let events = [true, true, false, true];

        let ascending = array![10.0, 20.0, 30.0, 40.0];
        let descending = array![40.0, 30.0, 20.0, 10.0];

        let perfect = concordance_index(time.view(), ascending.view(), &events);
        let reversed = concordance_index(time.view(), descending.view(), &events);
        let tied = concordance_index(time.view(), array![1.0, 1.0, 1.0, 1.0].view(), &events);

        assert_abs_diff_eq!(perfect, 1.0);
        assert_abs_diff_eq!(reversed, 0.0);
        assert_abs_diff_eq!(tied, 0.5);
    }

    #[test]
    fn test_concordance_uses_global_rows() {
        // Observation 2 (censored) and 3 (event) held out
        let loss = ValidationLoss::Concordance(vec![true, true, false, true]);
        let time = array![5.0, 2.0];
        let predicted = array![1.0, 2.0];

        // Only the event at t = 2 is comparable to t = 5, and it is mis-ordered
        assert_abs_diff_eq!(loss.evaluate(time.view(), predicted.view(), &[2, 3]), 1.0);
    }

    #[test]
    fn test_no_comparable_pairs_is_nan() {
        let time = array![1.0, 2.0];
        assert!(concordance_index(time.view(), array![0.0, 1.0].view(), &[false, false]).is_nan());
    }
}
