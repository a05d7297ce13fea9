//! Input helpers shared by the workflows and the CLI.

use super::error::Result;
use hidim_data::frame;
use hidim_data::{DataError, Design, SurvivalResponse};
use std::path::Path;

/// Load a design whose response is a follow-up time, together with the
/// event indicators of the `status` column.
///
/// Every other numeric column is a feature.
pub fn load_survival_design(
    path: &Path,
    time: &str,
    status: &str,
) -> Result<(Design, SurvivalResponse)> {
    let df = frame::read_csv(path)?;
    let response = SurvivalResponse::from_dataframe(&df, time, status)?;

    let mut features = Vec::new();
    for name in frame::column_names(&df) {
        if name == time || name == status || frame::is_text_column(&df, &name)? {
            continue;
        }
        features.push(name);
    }
    let design = Design::from_dataframe(&df, time, Some(&features))?;

    log::info!(
        "Loaded {} observations ({} events) with {} features",
        response.len(),
        response.n_events(),
        design.n_features()
    );
    Ok((design, response))
}

/// Split a comma-separated list of group labels.
pub fn parse_group_labels(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read one group label per sample from a CSV file, taking `column` or the
/// first column.
pub fn read_group_labels(path: &Path, column: Option<&str>) -> Result<Vec<String>> {
    let df = frame::read_csv(path)?;
    let name = match column {
        Some(name) => name.to_string(),
        None => frame::column_names(&df)
            .into_iter()
            .next()
            .ok_or_else(|| DataError::EmptyData(format!("{} has no columns", path.display())))?,
    };
    Ok(frame::text_column(&df, &name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_group_labels() {
        assert_eq!(parse_group_labels("a, a,b ,b,"), vec!["a", "a", "b", "b"]);
        assert!(parse_group_labels("").is_empty());
    }

    #[test]
    fn test_read_group_labels_from_csv() {
        let path = std::env::temp_dir().join("hidim_group_labels_test.csv");
        fs::write(&path, "sample,condition\ns1,ctrl\ns2,ctrl\ns3,drug\n").unwrap();

        let first = read_group_labels(&path, None).unwrap();
        let named = read_group_labels(&path, Some("condition")).unwrap();

        assert_eq!(first, vec!["s1", "s2", "s3"]);
        assert_eq!(named, vec!["ctrl", "ctrl", "drug"]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_survival_design() {
        let path = std::env::temp_dir().join("hidim_survival_design_test.csv");
        fs::write(
            &path,
            "id,time,status,age,marker\np1,5.0,1,60,0.2\np2,8.5,0,55,0.1\np3,2.0,1,70,0.9\n",
        )
        .unwrap();

        let (design, response) = load_survival_design(&path, "time", "status").unwrap();

        assert_eq!(design.feature_names(), ["age".to_string(), "marker".to_string()]);
        assert_eq!(design.y().to_vec(), vec![5.0, 8.5, 2.0]);
        assert_eq!(response.event(), [true, false, true]);
        assert_eq!(response.n_events(), 2);
        fs::remove_file(path).ok();
    }
}
