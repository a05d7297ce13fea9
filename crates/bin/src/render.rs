//! Terminal rendering and file export of result tables.

use clap::ValueEnum;
use hidim::output::{CoefficientTable, CvCurve, ExportFormat, Exporter, PathSummary, TopTable};
use std::error::Error;
use std::path::Path;

/// How a table is printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned plain-text table
    Ascii,
    /// Markdown table
    Markdown,
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
}

/// A table that can be shown in the terminal as well as exported.
pub(crate) trait Render: Exporter {
    /// Plain-text table; `step` thins long paths and curves
    fn ascii(&self, step: usize) -> String;

    /// Markdown table
    fn markdown(&self) -> String;
}

impl Render for CoefficientTable {
    fn ascii(&self, _step: usize) -> String {
        self.to_ascii_table()
    }

    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

impl Render for PathSummary {
    fn ascii(&self, step: usize) -> String {
        self.to_ascii_table(step)
    }

    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

impl Render for CvCurve {
    fn ascii(&self, step: usize) -> String {
        self.to_ascii_table(step)
    }

    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

impl Render for TopTable {
    fn ascii(&self, _step: usize) -> String {
        self.to_ascii_table()
    }

    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

/// Print `table` to stdout in `format`.
pub(crate) fn print_table<T: Render>(
    table: &T,
    format: OutputFormat,
    step: usize,
) -> Result<(), Box<dyn Error>> {
    let text = match format {
        OutputFormat::Ascii => table.ascii(step),
        OutputFormat::Markdown => table.markdown(),
        OutputFormat::Csv => table.export_to_string(ExportFormat::Csv)?,
        OutputFormat::Json => table.export_to_string(ExportFormat::PrettyJson)?,
    };
    println!("{text}");
    Ok(())
}

/// Export `table` to `path`, choosing CSV or JSON from the extension.
pub(crate) fn export_table<T: Exporter>(table: &T, path: &Path) -> Result<(), Box<dyn Error>> {
    table.export_to_file(path, ExportFormat::from_path(path)?)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}
