//! CSV dataset loader
//!
//! Accepts the scikit-learn `breast_cancer.csv` layout:
//!
//! ```text
//! 569,30,malignant,benign        <- optional: n_samples,n_features,class names
//! 17.99,10.38,...,0.1189,0       <- 30 features followed by the class index
//! ```
//!
//! A header row of column names is also accepted and skipped.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array2;

use super::{Dataset, DatasetError, DatasetResult};
use crate::logic::features::{class_labels, feature_names, FEATURE_COUNT};

/// Load a dataset from a CSV file
pub fn load_csv(path: impl AsRef<Path>) -> DatasetResult<Dataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let dataset = read_csv(file)?;

    log::info!(
        "Loaded {} samples from {}",
        dataset.n_samples(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV content from any reader
pub fn read_csv<R: std::io::Read>(reader: R) -> DatasetResult<Dataset> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut target_names = class_labels();
    let mut values: Vec<f64> = Vec::new();
    let mut targets: Vec<usize> = Vec::new();

    for (line, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        if line == 0 {
            if let Some(names) = header_class_names(&record) {
                if !names.is_empty() {
                    target_names = names;
                }
                continue;
            }
            if record.get(0).map_or(false, |f| f.parse::<f64>().is_err()) {
                // column-name header
                continue;
            }
        }

        if record.len() != FEATURE_COUNT + 1 {
            return Err(DatasetError::Invalid(format!(
                "line {}: expected {} columns, got {}",
                line + 1,
                FEATURE_COUNT + 1,
                record.len()
            )));
        }

        for field in record.iter().take(FEATURE_COUNT) {
            let value: f64 = field.parse().map_err(|_| {
                DatasetError::Invalid(format!("line {}: '{}' is not a number", line + 1, field))
            })?;
            values.push(value);
        }

        let target_field = &record[FEATURE_COUNT];
        let target = target_field
            .parse::<f64>()
            .ok()
            .filter(|t| t.fract() == 0.0 && *t >= 0.0)
            .map(|t| t as usize)
            .ok_or_else(|| {
                DatasetError::Invalid(format!(
                    "line {}: '{}' is not a class index",
                    line + 1,
                    target_field
                ))
            })?;
        targets.push(target);
    }

    if targets.is_empty() {
        return Err(DatasetError::Invalid("dataset has no rows".into()));
    }

    let features = Array2::from_shape_vec((targets.len(), FEATURE_COUNT), values)
        .map_err(|e| DatasetError::Invalid(e.to_string()))?;

    Dataset::new(features, targets, feature_names(), target_names)
}

/// `n_samples,n_features,class...` header used by scikit-learn's bundled CSVs
fn header_class_names(record: &StringRecord) -> Option<Vec<String>> {
    if record.len() < 2 || record.len() > FEATURE_COUNT {
        return None;
    }
    let n_samples = record[0].parse::<usize>().ok()?;
    let n_features = record[1].parse::<usize>().ok()?;
    if n_samples == 0 || n_features != FEATURE_COUNT {
        return None;
    }
    Some(record.iter().skip(2).map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: f64, target: usize) -> String {
        let mut fields: Vec<String> = (0..FEATURE_COUNT).map(|_| value.to_string()).collect();
        fields.push(target.to_string());
        fields.join(",")
    }

    #[test]
    fn test_count_header() {
        let csv = format!("2,30,malignant,benign\n{}\n{}\n", row(1.5, 0), row(0.5, 1));
        let data = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(data.n_samples(), 2);
        assert_eq!(data.targets, vec![0, 1]);
        assert_eq!(data.features[[0, 0]], 1.5);
        assert_eq!(data.target_names, vec!["malignant", "benign"]);
    }

    #[test]
    fn test_column_header_and_no_header() {
        let mut header: Vec<String> = (1..=FEATURE_COUNT).map(|i| format!("f{}", i)).collect();
        header.push("target".into());
        let csv = format!("{}\n{}\n", header.join(","), row(2.0, 1));
        assert_eq!(read_csv(csv.as_bytes()).unwrap().n_samples(), 1);

        let csv = format!("{}\n{}\n", row(2.0, 1), row(3.0, 0));
        assert_eq!(read_csv(csv.as_bytes()).unwrap().targets, vec![1, 0]);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let short = "1,2,3\n";
        assert!(matches!(read_csv(short.as_bytes()), Err(DatasetError::Invalid(_))));

        let bad_target = row(1.0, 0).replace(",0", ",x");
        let csv = format!("{}\n{}\n", row(1.0, 0), bad_target);
        assert!(read_csv(csv.as_bytes()).is_err());

        let out_of_range = format!("{}\n", row(1.0, 5));
        assert!(read_csv(out_of_range.as_bytes()).is_err());

        assert!(read_csv("".as_bytes()).is_err());
    }

    #[test]
    fn test_load_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, format!("{}\n{}\n", row(1.0, 0), row(2.0, 1))).unwrap();

        let data = load_csv(&path).unwrap();
        assert_eq!(data.class_counts(), vec![1, 1]);
    }
}
