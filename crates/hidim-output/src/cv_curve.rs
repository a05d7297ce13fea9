//! Cross-validation error curves.

use crate::export::{ExportError, ExportFormat, Exporter, records_to_csv, to_json};
use hidim_penalized::CrossValidationResult;
use serde::{Deserialize, Serialize};

/// One point of the CV curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    /// Penalty value.
    pub lambda: f64,

    /// Mean held-out error.
    pub mean_error: f64,

    /// Standard error of the mean.
    pub standard_error: f64,

    /// Folds that contributed.
    pub n_folds: usize,

    /// Non-zero coefficients of the full-data fit, when known.
    pub n_nonzero: Option<usize>,
}

/// CV curve with the selected penalties marked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvCurve {
    /// Loss name.
    pub loss: String,

    /// Number of folds.
    pub folds: usize,

    /// Curve points, largest penalty first.
    pub points: Vec<CurvePoint>,

    /// Penalty with the smallest mean error.
    pub lambda_min: f64,

    /// Largest penalty within one standard error of the minimum.
    pub lambda_1se: f64,

    /// Penalty used for the final fit.
    pub selected_lambda: f64,

    /// Folds excluded from the curve.
    pub skipped_folds: Vec<usize>,
}

impl CvCurve {
    /// Build from a CV result; `n_nonzero` optionally gives the sparsity of
    /// the full-data fit at each penalty.
    pub fn new(result: &CrossValidationResult, n_nonzero: Option<&[usize]>) -> Self {
        let points = result
            .lambdas
            .iter()
            .enumerate()
            .map(|(i, lambda)| CurvePoint {
                lambda,
                mean_error: result.mean_error[i],
                standard_error: result.standard_error[i],
                n_folds: result.n_contributing[i],
                n_nonzero: n_nonzero.and_then(|counts| counts.get(i).copied()),
            })
            .collect();

        Self {
            loss: result.loss.clone(),
            folds: result.n_folds(),
            points,
            lambda_min: result.lambda_min(),
            lambda_1se: result.lambda_1se(),
            selected_lambda: result.selected_lambda(),
            skipped_folds: result.skipped_folds.clone(),
        }
    }

    fn marker(&self, lambda: f64) -> &'static str {
        match (lambda == self.lambda_min, lambda == self.lambda_1se) {
            (true, true) => "min,1se",
            (true, false) => "min",
            (false, true) => "1se",
            (false, false) => "",
        }
    }

    /// Format as ASCII table, printing every `step`-th point plus the
    /// selected ones.
    pub fn to_ascii_table(&self, step: usize) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}-fold cross-validation ({})\n", self.folds, self.loss));
        output.push_str(&format!(
            "lambda.min = {:.6e}   lambda.1se = {:.6e}\n",
            self.lambda_min, self.lambda_1se
        ));
        if !self.skipped_folds.is_empty() {
            output.push_str(&format!("Skipped folds: {:?}\n", self.skipped_folds));
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:>14} {:>14} {:>14} {:>8} {:>10} {:>10}\n",
            "Lambda", "CV error", "Std. error", "Folds", "Non-zero", ""
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for (i, point) in self.points.iter().enumerate() {
            let marker = self.marker(point.lambda);
            if i % step.max(1) != 0 && marker.is_empty() {
                continue;
            }
            let nonzero = point.n_nonzero.map(|n| n.to_string()).unwrap_or_default();
            output.push_str(&format!(
                "{:>14.6e} {:>14.6} {:>14.6} {:>8} {:>10} {:>10}\n",
                point.lambda, point.mean_error, point.standard_error, point.n_folds, nonzero, marker
            ));
        }

        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}-fold cross-validation\n\n", self.folds));
        output.push_str(&format!("- **Loss:** {}\n", self.loss));
        output.push_str(&format!("- **lambda.min:** {:.6e}\n", self.lambda_min));
        output.push_str(&format!("- **lambda.1se:** {:.6e}\n", self.lambda_1se));
        output.push_str(&format!("- **Selected:** {:.6e}\n\n", self.selected_lambda));

        output.push_str("| Lambda | CV error | Std. error | Folds |\n");
        output.push_str("|--------|----------|------------|-------|\n");
        for point in &self.points {
            output.push_str(&format!(
                "| {:.6e} | {:.6} | {:.6} | {} |\n",
                point.lambda, point.mean_error, point.standard_error, point.n_folds
            ));
        }

        output
    }
}

impl Exporter for CvCurve {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.points),
            _ => to_json(self, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidim_penalized::{CrossValidation, FoldAssignment, PenaltyPath, RidgeSolver};
    use ndarray::{Array1, Array2};

    fn result() -> CrossValidationResult {
        let x = Array2::from_shape_fn((12, 2), |(i, j)| {
            (i as f64 + 1.0) * if j == 0 { 1.0 } else { -0.3 } + (i % 3) as f64
        });
        let y = Array1::from_shape_fn(12, |i| 2.0 * i as f64 + (i % 4) as f64);
        let path = PenaltyPath::new(vec![100.0, 10.0, 1.0, 0.1]).unwrap();
        let folds = FoldAssignment::sequential(12, 3).unwrap();
        CrossValidation::default()
            .run_observed(&RidgeSolver::default(), &x, &y, &path, &folds, |_, _| {})
            .unwrap()
    }

    #[test]
    fn test_curve_marks_selection() {
        let result = result();
        let curve = CvCurve::new(&result, Some(&[2, 2, 2, 2]));

        assert_eq!(curve.points.len(), 4);
        assert_eq!(curve.folds, 3);
        assert_eq!(curve.points[1].n_nonzero, Some(2));

        let ascii = curve.to_ascii_table(10);
        assert!(ascii.contains("min"));
        assert!(ascii.contains("3-fold cross-validation (mse)"));
        assert!(curve.to_markdown().contains("**lambda.1se:**"));
    }

    #[test]
    fn test_curve_csv() {
        let curve = CvCurve::new(&result(), None);
        let csv = curve.export_to_string(ExportFormat::Csv).unwrap();

        assert!(csv.starts_with("lambda,mean_error,standard_error,n_folds,n_nonzero"));
        assert_eq!(csv.lines().count(), 5);
    }
}
