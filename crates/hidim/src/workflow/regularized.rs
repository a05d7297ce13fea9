//! Cross-validated penalized regression.
//!
//! The workflow fits the default penalty path inside every fold, picks λ
//! from the CV curve with the configured rule, then refits the same path on
//! all observations and reads the coefficients off at the selected index.

use super::config::WorkflowConfig;
use super::error::Result;
use hidim_data::{Design, SurvivalResponse};
use hidim_output::{CoefficientTable, CvCurve, PathSummary, Report, ReportBuilder};
use hidim_penalized::{
    CoefficientPath, CrossValidation, CrossValidationResult, FoldAssignment, FoldStatus,
    ValidationLoss,
};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;
use serde_json::json;

/// Everything produced by one cross-validated fit.
#[derive(Debug, Clone, Serialize)]
pub struct RegularizedOutcome {
    /// Model description
    pub model: String,

    /// Raw cross-validation result
    pub cv: CrossValidationResult,

    /// Path refitted on all observations
    pub path: CoefficientPath,

    /// CV curve table
    pub curve: CvCurve,

    /// Non-zero coefficients at the selected penalty
    pub coefficients: CoefficientTable,

    /// Sparsity and norms along the refitted path
    pub summary: PathSummary,
}

impl RegularizedOutcome {
    /// Path index chosen by the selection rule.
    pub const fn selected_index(&self) -> usize {
        self.cv.selected_index()
    }

    /// Selected penalty.
    pub fn selected_lambda(&self) -> f64 {
        self.cv.selected_lambda()
    }

    /// Coefficients at the selected penalty, on the original feature scale.
    pub fn selected_coefficients(&self) -> ArrayView1<'_, f64> {
        self.path.coefficients_at(self.selected_index())
    }

    /// Predict new observations with the selected fit.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.path.predict(x, self.selected_index())?)
    }

    /// Wrap the curve and coefficients in a report envelope.
    pub fn report(&self, dataset: &str, config: &WorkflowConfig) -> Result<Report> {
        let report = ReportBuilder::new()
            .analysis("cross-validated penalized regression")
            .dataset(dataset)
            .parameters(&json!({
                "model": config.model,
                "cross_validation": config.cross_validation,
            }))?
            .contents(&json!({
                "model": self.model,
                "selected_lambda": self.selected_lambda(),
                "coefficients": self.coefficients,
                "cv_curve": self.curve,
            }))?
            .build()?;
        Ok(report)
    }
}

/// Cross-validation, refit and reporting for one penalized model.
#[derive(Debug, Default)]
pub struct RegularizedWorkflow {
    config: WorkflowConfig,
}

impl RegularizedWorkflow {
    /// Create a new workflow.
    pub const fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Score folds by concordance with a survival response instead of the
    /// configured loss. The design's response must hold the follow-up times.
    pub fn with_survival(mut self, response: &SurvivalResponse) -> Self {
        self.config.cross_validation.loss = ValidationLoss::Concordance(response.event().to_vec());
        self
    }

    /// Configuration in use.
    pub const fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Fit the default path on all observations without cross-validation.
    pub fn fit_path(&self, design: &Design) -> Result<CoefficientPath> {
        self.config.validate()?;
        let engine = self.config.model.engine()?;
        Ok(engine.fit(design.x(), design.y())?)
    }

    /// Run the full workflow.
    pub fn run(&self, design: &Design) -> Result<RegularizedOutcome> {
        self.run_observed(design, |_, _| {})
    }

    /// Run the full workflow, reporting each finished fold to `on_fold`.
    pub fn run_observed<F>(&self, design: &Design, on_fold: F) -> Result<RegularizedOutcome>
    where
        F: FnMut(usize, FoldStatus),
    {
        self.config.validate()?;
        let engine = self.config.model.engine()?;
        let model = self.config.model.name();
        let cv_config = &self.config.cross_validation;
        let (x, y) = (design.x(), design.y());

        let lambdas = engine.default_path(x, y)?;
        let folds =
            FoldAssignment::random(design.n_observations(), cv_config.folds, cv_config.seed)?;
        log::info!(
            "Cross-validating {model}: {} observations, {} features, {} penalties, {} folds",
            design.n_observations(),
            design.n_features(),
            lambdas.len(),
            folds.n_folds()
        );

        let cv = CrossValidation::new(cv_config.clone()).run_observed(
            engine.as_ref(),
            x,
            y,
            &lambdas,
            &folds,
            on_fold,
        )?;
        let path = engine.fit_path(x, y, &cv.lambdas)?;

        let counts: Vec<usize> = (0..path.len()).map(|i| path.n_nonzero(i)).collect();
        let curve = CvCurve::new(&cv, Some(&counts));
        let coefficients = CoefficientTable::from_path(
            model.clone(),
            design.feature_names(),
            &path,
            cv.selected_index(),
            true,
        );
        let summary = PathSummary::new(model.clone(), &path);

        log::info!(
            "Selected lambda = {:.4e} with {} non-zero coefficients",
            cv.selected_lambda(),
            counts[cv.selected_index()]
        );

        Ok(RegularizedOutcome {
            model,
            cv,
            path,
            curve,
            coefficients,
            summary,
        })
    }
}
