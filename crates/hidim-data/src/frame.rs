//! Tabular input.
//!
//! Thin helpers over polars for reading CSV files and pulling numeric
//! columns out of a [`DataFrame`] as ndarray vectors.

use crate::error::{DataError, Result};
use ndarray::Array1;
use polars::prelude::*;
use std::path::Path;

/// Read a CSV file with a header row into a [`DataFrame`].
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    if df.height() == 0 {
        return Err(DataError::EmptyData(format!(
            "{} has no data rows",
            path.display()
        )));
    }

    log::debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );

    Ok(df)
}

/// Names of every column in the frame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Whether the column holds text rather than numbers.
pub fn is_text_column(df: &DataFrame, name: &str) -> Result<bool> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    Ok(matches!(column.dtype(), DataType::String))
}

/// Extract a column as `f64` values.
///
/// Integer and boolean columns are cast; nulls or values that fail the cast
/// are rejected rather than silently replaced.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;

    if matches!(column.dtype(), DataType::String) {
        return Err(DataError::NonNumeric {
            column: name.to_string(),
            reason: "text column".to_string(),
        });
    }

    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| DataError::NonNumeric {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
    let values = series.f64()?;

    let mut out = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => out.push(v),
            Some(v) => {
                return Err(DataError::NonNumeric {
                    column: name.to_string(),
                    reason: format!("non-finite value {v} in row {row}"),
                });
            }
            None => {
                return Err(DataError::NonNumeric {
                    column: name.to_string(),
                    reason: format!("missing value in row {row}"),
                });
            }
        }
    }

    Ok(Array1::from_vec(out))
}

/// Extract a text column as owned strings.
pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let values = series.str()?;

    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}
