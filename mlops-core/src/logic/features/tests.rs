//! Integration Tests for the feature contract
//!
//! Layout and vector validation exercised together.

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{
        feature_names, layout::feature_index,
        vector::FeatureVector,
        FEATURE_COUNT, FEATURE_DESCRIPTIONS, FEATURE_LAYOUT,
    };
    use serde_json::{json, Map, Value};

    /// A record built from the layout validates back to the same values
    #[test]
    fn test_layout_driven_record_validates() {
        let record: Map<String, Value> = feature_names()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), json!(i as f64 * 0.1)))
            .collect();

        let vector = FeatureVector::from_record(&record).unwrap();
        for (i, value) in vector.as_slice().iter().enumerate() {
            assert!((value - i as f64 * 0.1).abs() < 1e-12);
        }
    }

    /// Missing, unknown and invalid fields are all reported in one pass
    #[test]
    fn test_all_issues_reported_together() {
        let mut record = FeatureVector::uniform(1.0).to_record();
        record.remove("feature_1");
        record.insert("feature_12".to_string(), json!(true));
        record.insert("radius".to_string(), json!(3.0));

        let issues = FeatureVector::from_record(&record).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["feature_1", "feature_12", "radius"]);
    }

    /// Empty objects report every feature as missing
    #[test]
    fn test_empty_record() {
        let issues = FeatureVector::from_record(&Map::new()).unwrap_err();
        assert_eq!(issues.len(), FEATURE_COUNT);
    }

    /// Descriptions line up with wire names
    #[test]
    fn test_descriptions_align_with_layout() {
        assert_eq!(feature_index("feature_8"), Some(7));
        assert_eq!(FEATURE_DESCRIPTIONS[7], "mean concave points");
        assert_eq!(FEATURE_LAYOUT[20], "feature_21");
        assert_eq!(FEATURE_DESCRIPTIONS[20], "worst radius");
    }
}
