//! Differential expression between two groups of samples.

use super::config::{TestingConfig, WorkflowConfig};
use super::error::Result;
use hidim_data::ExpressionSet;
use hidim_output::{Report, ReportBuilder, TopTable};
use hidim_testing::{ModeratedConfig, ModeratedTest, PriorEstimate, TestTable, two_sample_t_test};
use serde::Serialize;
use serde_json::json;

/// Result of a differential expression run.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionOutcome {
    /// Every feature, adjusted
    pub table: TestTable,

    /// Variance prior of the moderated test
    pub prior: Option<PriorEstimate>,

    /// Ranked top features
    pub top: TopTable,
}

impl ExpressionOutcome {
    /// Wrap the top table in a report envelope.
    pub fn report(&self, dataset: &str, config: &WorkflowConfig) -> Result<Report> {
        let report = ReportBuilder::new()
            .analysis("differential expression")
            .dataset(dataset)
            .parameters(&config.testing)?
            .contents(&json!({
                "n_tested": self.table.len(),
                "prior": self.prior,
                "top_table": self.top,
            }))?
            .build()?;
        Ok(report)
    }
}

/// Per-feature two-group testing.
#[derive(Debug, Default)]
pub struct DifferentialExpression {
    config: TestingConfig,
}

impl DifferentialExpression {
    /// Create a new workflow.
    pub const fn new(config: TestingConfig) -> Self {
        Self { config }
    }

    /// Test every feature of `set`, group 1 against group 0.
    pub fn run(&self, set: &ExpressionSet) -> Result<ExpressionOutcome> {
        let transformed;
        let set = match self.config.log2_offset {
            Some(offset) => {
                transformed = set.log2_transform(offset)?;
                &transformed
            }
            None => set,
        };

        let (table, prior) = if self.config.moderated {
            let result = ModeratedTest::new(ModeratedConfig {
                adjustment: self.config.adjustment,
            })
            .run(set)?;
            (result.table, Some(result.prior))
        } else {
            let table =
                two_sample_t_test(set, self.config.variant)?.adjust(self.config.adjustment)?;
            (table, None)
        };

        let mut top = TopTable::new(&table, self.config.top, self.config.level);
        if let Some(prior) = prior {
            top = top.with_prior(prior);
        }

        let (n0, n1) = set.group_sizes();
        let [reference, treated] = set.group_labels();
        log::info!(
            "{}: {} features, {treated} (n = {n1}) vs {reference} (n = {n0}), {} significant at {}",
            table.test,
            table.len(),
            top.n_significant,
            self.config.level
        );

        Ok(ExpressionOutcome { table, prior, top })
    }
}
