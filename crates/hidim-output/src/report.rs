//! JSON report envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required field missing from the builder.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// A timestamped analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Analysis name, e.g. `"cv"` or `"de"`.
    pub analysis: String,

    /// Input data set.
    pub dataset: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Settings the analysis ran with.
    pub parameters: serde_json::Value,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(
        analysis: String,
        dataset: String,
        parameters: serde_json::Value,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            analysis,
            dataset,
            timestamp: Utc::now(),
            parameters,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    analysis: Option<String>,
    dataset: Option<String>,
    parameters: Option<serde_json::Value>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the analysis name.
    pub fn analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = Some(analysis.into());
        self
    }

    /// Set the data set name.
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Set the parameters from any serializable config.
    pub fn parameters<T: Serialize>(mut self, parameters: &T) -> Result<Self, ReportError> {
        self.parameters = Some(serde_json::to_value(parameters)?);
        Ok(self)
    }

    /// Set the report contents from any serializable value.
    pub fn contents<T: Serialize>(mut self, contents: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.analysis.ok_or(ReportError::MissingField("analysis"))?,
            self.dataset.unwrap_or_default(),
            self.parameters.unwrap_or(serde_json::Value::Null),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new(
            "cv".to_string(),
            "prostate.csv".to_string(),
            serde_json::json!({"folds": 10}),
            serde_json::json!({"lambda_min": 0.1}),
        );

        assert_eq!(report.analysis, "cv");
        assert_eq!(report.parameters["folds"], 10);
        assert!(report.to_json().unwrap().contains("\"timestamp\""));
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .analysis("de")
            .dataset("leukemia.csv")
            .contents(&vec![1, 2, 3])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(report.dataset, "leukemia.csv");
        assert_eq!(report.contents, serde_json::json!([1, 2, 3]));
        assert!(report.parameters.is_null());
    }

    #[test]
    fn test_builder_requires_analysis() {
        assert!(matches!(
            ReportBuilder::new().build(),
            Err(ReportError::MissingField("analysis"))
        ));
    }
}
