//! Feature Vector - Validated model input
//!
//! A `FeatureVector` can only be built from input that supplies every feature
//! of the layout exactly once, as a finite number. Validation collects every
//! problem in the input instead of stopping at the first one, so callers can
//! report all offending fields together.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};

// ============================================================================
// FIELD ISSUES
// ============================================================================

/// One problem found while validating input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(field, "field required")
    }

    pub fn unknown(field: &str) -> Self {
        Self::new(field, "unknown field")
    }

    /// Prefix the field path, e.g. `records[3].feature_1`
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.field = format!("{}.{}", prefix, self.field);
        self
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Exactly FEATURE_COUNT values in FEATURE_LAYOUT order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Validate a named record (JSON object of `feature_name -> number`)
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let mut values = [0.0f64; FEATURE_COUNT];

        for (index, name) in FEATURE_LAYOUT.iter().enumerate() {
            match record.get(*name) {
                None => issues.push(FieldIssue::missing(name)),
                Some(value) => match finite_number(value) {
                    Ok(v) => values[index] = v,
                    Err(message) => issues.push(FieldIssue::new(*name, message)),
                },
            }
        }

        for key in record.keys() {
            if feature_index(key).is_none() {
                issues.push(FieldIssue::unknown(key));
            }
        }

        if issues.is_empty() {
            Ok(Self { values })
        } else {
            Err(issues)
        }
    }

    /// Validate a positional row (values already in layout order)
    pub fn from_row(row: &[f64]) -> Result<Self, Vec<FieldIssue>> {
        if row.len() != FEATURE_COUNT {
            return Err(vec![FieldIssue::new(
                "row",
                format!("expected {} values, got {}", FEATURE_COUNT, row.len()),
            )]);
        }

        let issues: Vec<FieldIssue> = row
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_finite())
            .map(|(i, _)| FieldIssue::new(FEATURE_LAYOUT[i], "value must be a finite number"))
            .collect();

        if !issues.is_empty() {
            return Err(issues);
        }

        let mut values = [0.0f64; FEATURE_COUNT];
        values.copy_from_slice(row);
        Ok(Self { values })
    }

    /// Every feature set to the same value
    pub fn uniform(value: f64) -> Self {
        Self {
            values: [value; FEATURE_COUNT],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Named JSON representation, the inverse of `from_record`
    pub fn to_record(&self) -> Map<String, Value> {
        FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.to_string(), Value::from(*value)))
            .collect()
    }
}

fn finite_number(value: &Value) -> Result<f64, &'static str> {
    match value.as_f64() {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err("value must be a finite number"),
        None => Err("value is not a valid float"),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record(value: f64) -> Map<String, Value> {
        FeatureVector::uniform(value).to_record()
    }

    #[test]
    fn test_from_record_accepts_complete_input() {
        let vector = FeatureVector::from_record(&full_record(0.5)).unwrap();
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert!(vector.as_slice().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_from_record_preserves_layout_order() {
        let mut record = full_record(0.0);
        record.insert("feature_7".to_string(), json!(7.5));

        let vector = FeatureVector::from_record(&record).unwrap();
        assert_eq!(vector.get(6), Some(7.5));
        assert_eq!(vector.get_by_name("feature_7"), Some(7.5));
    }

    #[test]
    fn test_integer_values_are_accepted() {
        let mut record = full_record(1.0);
        record.insert("feature_4".to_string(), json!(600));

        let vector = FeatureVector::from_record(&record).unwrap();
        assert_eq!(vector.get_by_name("feature_4"), Some(600.0));
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut record = full_record(0.5);
        record.remove("feature_3");
        record.remove("feature_30");

        let issues = FeatureVector::from_record(&record).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["feature_3", "feature_30"]);
        assert!(issues.iter().all(|i| i.message == "field required"));
    }

    #[test]
    fn test_extra_fields_are_rejected() {
        let mut record = full_record(0.5);
        record.insert("feature_31".to_string(), json!(1.0));

        let issues = FeatureVector::from_record(&record).unwrap_err();
        assert_eq!(issues, vec![FieldIssue::unknown("feature_31")]);
    }

    #[test]
    fn test_non_numeric_values_are_rejected() {
        let mut record = full_record(0.5);
        record.insert("feature_2".to_string(), json!("abc"));
        record.insert("feature_9".to_string(), Value::Null);

        let issues = FeatureVector::from_record(&record).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "feature_2");
        assert_eq!(issues[1].field, "feature_9");
    }

    #[test]
    fn test_from_row() {
        let row = vec![1.0; FEATURE_COUNT];
        assert!(FeatureVector::from_row(&row).is_ok());

        let short = vec![1.0; FEATURE_COUNT - 1];
        let issues = FeatureVector::from_row(&short).unwrap_err();
        assert_eq!(issues[0].field, "row");

        let mut bad = vec![1.0; FEATURE_COUNT];
        bad[4] = f64::NAN;
        let issues = FeatureVector::from_row(&bad).unwrap_err();
        assert_eq!(issues[0].field, "feature_5");
    }

    #[test]
    fn test_issue_prefix() {
        let issue = FieldIssue::missing("feature_1").prefixed("records[4]");
        assert_eq!(issue.field, "records[4].feature_1");
        assert_eq!(issue.to_string(), "records[4].feature_1: field required");
    }
}
