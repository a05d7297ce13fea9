//! Ranked per-feature test results.

use crate::export::{ExportError, ExportFormat, Exporter, records_to_csv, to_json};
use hidim_testing::{PriorEstimate, TestRow, TestTable};
use serde::{Deserialize, Serialize};

/// The most significant features of a test table, ranked by raw p-value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopTable {
    /// Test that produced the statistics.
    pub test: String,

    /// Adjustment method of `adjusted_p_value`.
    pub adjustment: String,

    /// Features tested in total.
    pub n_tested: usize,

    /// Features with adjusted p-value at or below `level`.
    pub n_significant: usize,

    /// Significance level used for `n_significant`.
    pub level: f64,

    /// Variance prior, for moderated tests.
    pub prior: Option<PriorEstimate>,

    /// Ranked rows.
    pub rows: Vec<TestRow>,
}

impl TopTable {
    /// Keep the `n` most significant rows of `table`.
    pub fn new(table: &TestTable, n: usize, level: f64) -> Self {
        Self {
            test: table.test.clone(),
            adjustment: table.adjustment.to_string(),
            n_tested: table.len(),
            n_significant: table.significant(level).len(),
            level,
            prior: None,
            rows: table.top(n).into_iter().cloned().collect(),
        }
    }

    /// Attach the variance prior of a moderated test.
    pub const fn with_prior(mut self, prior: PriorEstimate) -> Self {
        self.prior = Some(prior);
        self
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nTop table: {}\n", self.test));
        output.push_str(&format!(
            "{} of {} features significant at {} ({} adjusted)\n",
            self.n_significant, self.n_tested, self.level, self.adjustment
        ));
        if let Some(prior) = &self.prior {
            output.push_str(&format!(
                "Variance prior: d0 = {:.3}, s0^2 = {:.4e}\n",
                prior.df, prior.variance
            ));
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>10} {:>10} {:>10} {:>13} {:>13}\n",
            "Feature", "logFC", "AveExpr", "t", "P.Value", "adj.P.Val"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<20} {:>10.4} {:>10.4} {:>10.3} {:>13.3e} {:>13.3e}\n",
                row.feature,
                row.effect,
                row.average,
                row.statistic,
                row.p_value,
                row.adjusted_p_value
            ));
        }

        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Top table: {}\n\n", self.test));
        output.push_str(&format!(
            "**Significant:** {} of {} at {} ({} adjusted)\n\n",
            self.n_significant, self.n_tested, self.level, self.adjustment
        ));
        output.push_str("| Feature | logFC | AveExpr | t | P.Value | adj.P.Val |\n");
        output.push_str("|---------|-------|---------|---|---------|-----------|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {:.4} | {:.4} | {:.3} | {:.3e} | {:.3e} |\n",
                row.feature,
                row.effect,
                row.average,
                row.statistic,
                row.p_value,
                row.adjusted_p_value
            ));
        }

        output
    }
}

impl Exporter for TopTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.rows),
            _ => to_json(self, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidim_testing::AdjustmentMethod;

    fn table() -> TestTable {
        let rows = [("g1", 0.3), ("g2", 0.0001), ("g3", 0.02), ("g4", 0.9)]
            .into_iter()
            .map(|(name, p)| TestRow {
                feature: name.to_string(),
                effect: 1.0,
                average: 5.0,
                statistic: 2.0,
                df: 8.0,
                p_value: p,
                adjusted_p_value: p,
            })
            .collect();
        TestTable::new("moderated t", rows)
            .adjust(AdjustmentMethod::BenjaminiHochberg)
            .unwrap()
    }

    #[test]
    fn test_top_table_ranks_by_p_value() {
        let top = TopTable::new(&table(), 2, 0.05);

        assert_eq!(top.rows.len(), 2);
        assert_eq!(top.rows[0].feature, "g2");
        assert_eq!(top.rows[1].feature, "g3");
        assert_eq!(top.n_tested, 4);
        assert_eq!(top.n_significant, 2);
        assert_eq!(top.adjustment, "BH");
    }

    #[test]
    fn test_top_table_formats() {
        let top = TopTable::new(&table(), 10, 0.05).with_prior(PriorEstimate {
            df: 4.2,
            variance: 0.05,
            n_used: 4,
        });

        let ascii = top.to_ascii_table();
        assert!(ascii.contains("adj.P.Val"));
        assert!(ascii.contains("d0 = 4.200"));
        assert!(top.to_markdown().contains("| g2 |"));

        let csv = top.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("feature,effect,average,statistic,df,p_value,adjusted_p_value"));
        let json = top.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"prior\""));
    }
}
