//! Workflow configuration.

use super::error::{Result, WorkflowError};
use hidim_penalized::{
    CrossValidationConfig, ElasticNet, ElasticNetConfig, PathConfig, PenalizedFit, Preprocessing,
    RidgeConfig, RidgeSolver,
};
use hidim_testing::{AdjustmentMethod, TTestVariant};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Penalized model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Mixing parameter: 0 = Ridge, 1 = Lasso
    pub alpha: f64,

    /// Intercept and scaling behaviour
    pub preprocessing: Preprocessing,

    /// Default path generation
    pub path: PathConfig,

    /// Maximum coordinate-descent sweeps per penalty
    pub max_iterations: usize,

    /// Coordinate-descent convergence threshold
    pub tolerance: f64,

    /// Fail on non-convergence instead of flagging the fit
    pub strict: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let solver = ElasticNetConfig::default();
        Self {
            alpha: solver.alpha,
            preprocessing: solver.preprocessing,
            path: solver.path,
            max_iterations: solver.max_iterations,
            tolerance: solver.tolerance,
            strict: solver.strict,
        }
    }
}

impl ModelConfig {
    /// Human-readable model name.
    pub fn name(&self) -> String {
        if self.alpha == 0.0 {
            "ridge".to_string()
        } else if self.alpha == 1.0 {
            "lasso".to_string()
        } else {
            format!("elastic net (alpha = {})", self.alpha)
        }
    }

    /// Build the solver: closed-form Ridge for α = 0, coordinate descent
    /// otherwise.
    pub fn engine(&self) -> Result<Box<dyn PenalizedFit>> {
        if self.alpha == 0.0 {
            return Ok(Box::new(RidgeSolver::new(RidgeConfig {
                preprocessing: self.preprocessing,
                path: self.path.clone(),
            })));
        }

        let solver = ElasticNet::new(ElasticNetConfig {
            alpha: self.alpha,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            strict: self.strict,
            preprocessing: self.preprocessing,
            path: self.path.clone(),
        })?;
        Ok(Box::new(solver))
    }
}

/// Per-feature testing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TestingConfig {
    /// Use the empirical-Bayes moderated t statistic
    pub moderated: bool,

    /// Variance model of the classical t-test
    pub variant: TTestVariant,

    /// Multiple-testing adjustment
    pub adjustment: AdjustmentMethod,

    /// Rows kept in the top table
    pub top: usize,

    /// Significance level on the adjusted p-values
    pub level: f64,

    /// Apply `log2(x + offset)` before testing
    pub log2_offset: Option<f64>,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            moderated: true,
            variant: TTestVariant::default(),
            adjustment: AdjustmentMethod::default(),
            top: 20,
            level: 0.05,
            log2_offset: None,
        }
    }
}

/// Settings for every workflow, loadable from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Penalized model
    pub model: ModelConfig,

    /// Penalty selection
    pub cross_validation: CrossValidationConfig,

    /// Differential expression
    pub testing: TestingConfig,
}

impl WorkflowConfig {
    /// Parse from a JSON string; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loaded workflow configuration from {}", path.display());
        Self::from_json(&json)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.model.alpha) {
            return Err(WorkflowError::InvalidConfig(format!(
                "model.alpha must lie in [0, 1], got {}",
                self.model.alpha
            )));
        }
        if self.cross_validation.folds < 2 {
            return Err(WorkflowError::InvalidConfig(format!(
                "cross_validation.folds must be at least 2, got {}",
                self.cross_validation.folds
            )));
        }
        if !(self.testing.level > 0.0 && self.testing.level < 1.0) {
            return Err(WorkflowError::InvalidConfig(format!(
                "testing.level must lie in (0, 1), got {}",
                self.testing.level
            )));
        }
        if let Some(offset) = self.testing.log2_offset
            && (offset.is_nan() || offset < 0.0)
        {
            return Err(WorkflowError::InvalidConfig(format!(
                "testing.log2_offset must be non-negative, got {offset}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidim_penalized::SelectionRule;
    use rstest::rstest;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorkflowConfig::from_json(
            r#"{
                "model": { "alpha": 0.5 },
                "cross_validation": { "folds": 5, "rule": "OneStandardError" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.model.alpha, 0.5);
        assert_eq!(config.model.max_iterations, 10_000);
        assert_eq!(config.cross_validation.folds, 5);
        assert_eq!(config.cross_validation.rule, SelectionRule::OneStandardError);
        assert_eq!(config.cross_validation.seed, 42);
        assert!(config.testing.moderated);
    }

    #[rstest]
    #[case(r#"{ "model": { "preprocessing": { "standardize": false } } }"#)]
    #[case(r#"{ "model": { "path": { "n_lambda": 25 } } }"#)]
    #[case(r#"{ "cross_validation": { "seed": 7 } }"#)]
    fn test_partial_nested_objects_accepted(#[case] json: &str) {
        let config = WorkflowConfig::from_json(json).unwrap();
        let defaults = WorkflowConfig::default();

        assert!(config.model.preprocessing.fit_intercept);
        assert_eq!(config.model.path.min_ratio, defaults.model.path.min_ratio);
        assert_eq!(config.cross_validation.folds, defaults.cross_validation.folds);
        assert_eq!(config.cross_validation.loss, defaults.cross_validation.loss);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = WorkflowConfig::default();
        let parsed = WorkflowConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[rstest]
    #[case(r#"{ "model": { "alpha": 1.5 } }"#)]
    #[case(r#"{ "cross_validation": { "folds": 1 } }"#)]
    #[case(r#"{ "testing": { "level": 0.0 } }"#)]
    #[case(r#"{ "testing": { "log2_offset": -1.0 } }"#)]
    fn test_invalid_values_rejected(#[case] json: &str) {
        assert!(matches!(
            WorkflowConfig::from_json(json),
            Err(WorkflowError::InvalidConfig(_))
        ));
    }

    #[rstest]
    #[case(0.0, "ridge")]
    #[case(1.0, "lasso")]
    #[case(0.5, "elastic net (alpha = 0.5)")]
    fn test_model_name_and_engine(#[case] alpha: f64, #[case] name: &str) {
        let model = ModelConfig {
            alpha,
            ..Default::default()
        };
        assert_eq!(model.name(), name);
        assert_eq!(model.engine().unwrap().alpha(), alpha);
    }
}
