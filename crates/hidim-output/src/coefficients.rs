//! Coefficient tables for least-squares and penalized fits.

use crate::export::{ExportError, ExportFormat, Exporter, records_to_csv, to_json};
use hidim_penalized::{CoefficientPath, OlsFit};
use serde::{Deserialize, Serialize};

/// One coefficient with optional inference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoefficientRow {
    /// Term name (`"(Intercept)"` for the intercept).
    pub term: String,

    /// Point estimate.
    pub estimate: f64,

    /// Standard error (least squares only).
    pub std_error: Option<f64>,

    /// t statistic (least squares only).
    pub t_value: Option<f64>,

    /// Two-sided p-value (least squares only).
    pub p_value: Option<f64>,
}

/// Coefficients of one fitted model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoefficientTable {
    /// Model description.
    pub model: String,

    /// Penalty of a penalized fit.
    pub lambda: Option<f64>,

    /// Rows, intercept first.
    pub rows: Vec<CoefficientRow>,

    /// R² of a least-squares fit.
    pub r_squared: Option<f64>,

    /// Residual standard error of a least-squares fit.
    pub sigma: Option<f64>,
}

impl CoefficientTable {
    /// Table of a least-squares fit with full inference.
    pub fn from_ols(feature_names: &[String], fit: &OlsFit) -> Self {
        let mut terms: Vec<String> = Vec::with_capacity(fit.estimates.len());
        if fit.has_intercept {
            terms.push("(Intercept)".to_string());
        }
        terms.extend(feature_names.iter().cloned());

        let rows = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| CoefficientRow {
                term,
                estimate: fit.estimates[i],
                std_error: Some(fit.standard_errors[i]),
                t_value: Some(fit.t_values[i]),
                p_value: Some(fit.p_values[i]),
            })
            .collect();

        Self {
            model: "ordinary least squares".to_string(),
            lambda: None,
            rows,
            r_squared: Some(fit.r_squared),
            sigma: Some(fit.residual_variance.sqrt()),
        }
    }

    /// Table of the `index`-th fit on a penalized path.
    ///
    /// With `nonzero_only`, features whose coefficient is exactly zero are
    /// left out.
    pub fn from_path(
        model: impl Into<String>,
        feature_names: &[String],
        path: &CoefficientPath,
        index: usize,
        nonzero_only: bool,
    ) -> Self {
        let coefficients = path.coefficients_at(index);
        let mut rows = vec![CoefficientRow {
            term: "(Intercept)".to_string(),
            estimate: path.intercept_at(index),
            std_error: None,
            t_value: None,
            p_value: None,
        }];
        rows.extend(
            feature_names
                .iter()
                .zip(coefficients.iter())
                .filter(|&(_, &b)| !nonzero_only || b != 0.0)
                .map(|(name, &b)| CoefficientRow {
                    term: name.clone(),
                    estimate: b,
                    std_error: None,
                    t_value: None,
                    p_value: None,
                }),
        );

        Self {
            model: model.into(),
            lambda: Some(path.lambdas().values()[index]),
            rows,
            r_squared: None,
            sigma: None,
        }
    }

    fn has_inference(&self) -> bool {
        self.rows.iter().any(|r| r.std_error.is_some())
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nCoefficients: {}\n", self.model));
        if let Some(lambda) = self.lambda {
            output.push_str(&format!("Lambda: {lambda:.6e}\n"));
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');

        if self.has_inference() {
            output.push_str(&format!(
                "{:<24} {:>12} {:>12} {:>12} {:>12}\n",
                "Term", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
            ));
        } else {
            output.push_str(&format!("{:<24} {:>12}\n", "Term", "Estimate"));
        }
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            match (row.std_error, row.t_value, row.p_value) {
                (Some(se), Some(t), Some(p)) => output.push_str(&format!(
                    "{:<24} {:>12.5} {:>12.5} {:>12.3} {:>12.3e}\n",
                    row.term, row.estimate, se, t, p
                )),
                _ => output.push_str(&format!("{:<24} {:>12.5}\n", row.term, row.estimate)),
            }
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        if let (Some(r2), Some(sigma)) = (self.r_squared, self.sigma) {
            output.push_str(&format!("Residual standard error: {sigma:.4}   R²: {r2:.4}\n"));
        } else {
            output.push_str(&format!("Non-zero features: {}\n", self.rows.len() - 1));
        }

        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Coefficients: {}\n\n", self.model));
        if let Some(lambda) = self.lambda {
            output.push_str(&format!("**Lambda:** {lambda:.6e}\n\n"));
        }

        if self.has_inference() {
            output.push_str("| Term | Estimate | Std. Error | t value | Pr(>\\|t\\|) |\n");
            output.push_str("|------|----------|------------|---------|------------|\n");
        } else {
            output.push_str("| Term | Estimate |\n");
            output.push_str("|------|----------|\n");
        }

        for row in &self.rows {
            match (row.std_error, row.t_value, row.p_value) {
                (Some(se), Some(t), Some(p)) => output.push_str(&format!(
                    "| {} | {:.5} | {:.5} | {:.3} | {:.3e} |\n",
                    row.term, row.estimate, se, t, p
                )),
                _ => output.push_str(&format!("| {} | {:.5} |\n", row.term, row.estimate)),
            }
        }

        output
    }
}

impl Exporter for CoefficientTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.rows),
            _ => to_json(self, format),
        }
    }
}

/// One point of a coefficient path summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathPoint {
    /// Penalty value.
    pub lambda: f64,

    /// Exactly non-zero coefficients.
    pub n_nonzero: usize,

    /// ‖β‖₁.
    pub l1_norm: f64,

    /// ‖β‖₂.
    pub l2_norm: f64,

    /// Solver iterations.
    pub iterations: usize,
}

/// Sparsity and size of the coefficients along a path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSummary {
    /// Model description.
    pub model: String,

    /// One entry per penalty value, largest first.
    pub points: Vec<PathPoint>,
}

impl PathSummary {
    /// Summarize a fitted path.
    pub fn new(model: impl Into<String>, path: &CoefficientPath) -> Self {
        let points = path
            .lambdas()
            .iter()
            .enumerate()
            .map(|(i, lambda)| PathPoint {
                lambda,
                n_nonzero: path.n_nonzero(i),
                l1_norm: path.l1_norm(i),
                l2_norm: path.l2_norm(i),
                iterations: path.iterations()[i],
            })
            .collect();
        Self {
            model: model.into(),
            points,
        }
    }

    /// Format as ASCII table, printing every `step`-th point.
    pub fn to_ascii_table(&self, step: usize) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nCoefficient path: {}\n", self.model));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:>6} {:>14} {:>10} {:>14} {:>14} {:>10}\n",
            "Index", "Lambda", "Non-zero", "L1 norm", "L2 norm", "Iter."
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        let last = self.points.len().saturating_sub(1);
        for (i, point) in self.points.iter().enumerate() {
            if i % step.max(1) != 0 && i != last {
                continue;
            }
            output.push_str(&format!(
                "{:>6} {:>14.6e} {:>10} {:>14.5} {:>14.5} {:>10}\n",
                i, point.lambda, point.n_nonzero, point.l1_norm, point.l2_norm, point.iterations
            ));
        }

        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Coefficient path: {}\n\n", self.model));
        output.push_str("| Lambda | Non-zero | L1 norm | L2 norm |\n");
        output.push_str("|--------|----------|---------|---------|\n");
        for point in &self.points {
            output.push_str(&format!(
                "| {:.6e} | {} | {:.5} | {:.5} |\n",
                point.lambda, point.n_nonzero, point.l1_norm, point.l2_norm
            ));
        }

        output
    }
}

impl Exporter for PathSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.points),
            _ => to_json(self, format),
        }
    }
}
