//! Multiple-testing adjustment
//!
//! All methods return adjusted p-values in the input order. Step-up and
//! step-down methods work on the ascending order of the raw values and
//! enforce monotonicity with a running extremum.

use crate::error::{Result, TestingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// p-value adjustment method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentMethod {
    /// Raw p-values
    None,
    /// Family-wise error control, `min(1, m p)`
    Bonferroni,
    /// Holm step-down
    Holm,
    /// False discovery rate (Benjamini-Hochberg step-up)
    #[default]
    BenjaminiHochberg,
    /// FDR under arbitrary dependence (Benjamini-Yekutieli)
    BenjaminiYekutieli,
}

impl AdjustmentMethod {
    /// Adjust `p_values`
    pub fn adjust(self, p_values: &[f64]) -> Result<Vec<f64>> {
        adjust_p_values(p_values, self)
    }
}

impl fmt::Display for AdjustmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Bonferroni => "bonferroni",
            Self::Holm => "holm",
            Self::BenjaminiHochberg => "BH",
            Self::BenjaminiYekutieli => "BY",
        };
        f.write_str(name)
    }
}

impl FromStr for AdjustmentMethod {
    type Err = TestingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "bonferroni" => Ok(Self::Bonferroni),
            "holm" => Ok(Self::Holm),
            "bh" | "fdr" | "benjamini-hochberg" => Ok(Self::BenjaminiHochberg),
            "by" | "benjamini-yekutieli" => Ok(Self::BenjaminiYekutieli),
            other => Err(TestingError::InvalidParameter(format!(
                "unknown adjustment method: {other}"
            ))),
        }
    }
}

/// Adjust `p_values` with `method`
pub fn adjust_p_values(p_values: &[f64], method: AdjustmentMethod) -> Result<Vec<f64>> {
    if let Some((index, &value)) = p_values
        .iter()
        .enumerate()
        .find(|&(_, p)| p.is_nan() || !(0.0..=1.0).contains(p))
    {
        return Err(TestingError::InvalidPValue { index, value });
    }

    let m = p_values.len();
    if m == 0 {
        return Ok(Vec::new());
    }
    let mf = m as f64;

    let adjusted = match method {
        AdjustmentMethod::None => p_values.to_vec(),
        AdjustmentMethod::Bonferroni => p_values.iter().map(|p| (p * mf).min(1.0)).collect(),
        AdjustmentMethod::Holm => {
            let order = ascending_order(p_values);
            let mut out = vec![0.0; m];
            let mut running = 0.0_f64;
            for (rank, &i) in order.iter().enumerate() {
                let candidate = ((mf - rank as f64) * p_values[i]).min(1.0);
                running = running.max(candidate);
                out[i] = running;
            }
            out
        }
        AdjustmentMethod::BenjaminiHochberg => step_up(p_values, 1.0),
        AdjustmentMethod::BenjaminiYekutieli => {
            let harmonic: f64 = (1..=m).map(|i| 1.0 / i as f64).sum();
            step_up(p_values, harmonic)
        }
    };

    Ok(adjusted)
}

/// `min_{j ≥ i} (m c / j) p₍ⱼ₎`, capped at 1
fn step_up(p_values: &[f64], c: f64) -> Vec<f64> {
    let m = p_values.len();
    let order = ascending_order(p_values);
    let mut out = vec![0.0; m];
    let mut running = 1.0_f64;
    for (rank, &i) in order.iter().enumerate().rev() {
        let candidate = m as f64 * c / (rank + 1) as f64 * p_values[i];
        running = running.min(candidate);
        out[i] = running;
    }
    out
}

/// Indices sorting `values` ascending; ties keep input order
fn ascending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}
