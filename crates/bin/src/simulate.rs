//! CSV writers for simulated data sets.

use hidim::data::{Design, ExpressionSet};
use std::error::Error;
use std::path::Path;

/// Write a design as CSV: one column per feature, then the response `y`.
pub(crate) fn write_design(design: &Design, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = design.feature_names().iter().map(String::as_str).collect();
    header.push("y");
    wtr.write_record(&header)?;

    for (row, y) in design.x().rows().into_iter().zip(design.y().iter()) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(y.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn sample_names(n: usize) -> Vec<String> {
    (1..=n).map(|s| format!("sample{s}")).collect()
}

/// Write expression values as CSV: feature name first, then one column per
/// sample.
pub(crate) fn write_expression(set: &ExpressionSet, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["feature".to_string()];
    header.extend(sample_names(set.n_samples()));
    wtr.write_record(&header)?;

    for (name, row) in set.feature_names().iter().zip(set.values().rows()) {
        let mut record = vec![name.clone()];
        record.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the group label of every sample as CSV, label first.
pub(crate) fn write_groups(set: &ExpressionSet, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["group", "sample"])?;

    let labels = set.group_labels();
    for (sample, &group) in sample_names(set.n_samples()).iter().zip(set.groups()) {
        wtr.write_record([labels[group].as_str(), sample.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
