//! Feature Layout - wire names, order and class labels
//!
//! **Training and serving both read the schema from here.**
//!
//! Bump FEATURE_VERSION whenever a feature is added, removed or reordered,
//! or when the class labels change.
//!
//! The layout hash is stored inside every exported model. A model trained
//! against a different layout is refused at load time.

use std::sync::OnceLock;

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Wire names of the features, in the exact order the model consumes them
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Mean values (1-10) ===
    "feature_1",  // mean radius
    "feature_2",  // mean texture
    "feature_3",  // mean perimeter
    "feature_4",  // mean area
    "feature_5",  // mean smoothness
    "feature_6",  // mean compactness
    "feature_7",  // mean concavity
    "feature_8",  // mean concave points
    "feature_9",  // mean symmetry
    "feature_10", // mean fractal dimension

    // === Standard errors (11-20) ===
    "feature_11", // radius error
    "feature_12", // texture error
    "feature_13", // perimeter error
    "feature_14", // area error
    "feature_15", // smoothness error
    "feature_16", // compactness error
    "feature_17", // concavity error
    "feature_18", // concave points error
    "feature_19", // symmetry error
    "feature_20", // fractal dimension error

    // === Worst values (21-30) ===
    "feature_21", // worst radius
    "feature_22", // worst texture
    "feature_23", // worst perimeter
    "feature_24", // worst area
    "feature_25", // worst smoothness
    "feature_26", // worst compactness
    "feature_27", // worst concavity
    "feature_28", // worst concave points
    "feature_29", // worst symmetry
    "feature_30", // worst fractal dimension
];

/// Dataset measurement names, aligned index-for-index with FEATURE_LAYOUT
pub const FEATURE_DESCRIPTIONS: &[&str] = &[
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Number of model inputs; checked against FEATURE_LAYOUT in tests
pub const FEATURE_COUNT: usize = 30;

/// Class labels, indexed by predicted class
pub const CLASS_LABELS: &[&str] = &["malignant", "benign"];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version, the feature names and the class labels, in order
pub fn layout_hash() -> u32 {
    static HASH: OnceLock<u32> = OnceLock::new();

    *HASH.get_or_init(|| {
        let mut hasher = Hasher::new();
        hasher.update(&[FEATURE_VERSION]);
        for name in FEATURE_LAYOUT.iter().chain(CLASS_LABELS) {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize()
    })
}

/// Error when a model artifact was built for a different feature layout
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "model was trained on feature layout v{found_version} ({found_hash:08x}), \
     this build expects v{expected_version} ({expected_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub found_version: u8,
    pub found_hash: u32,
}

/// Accept an artifact only if it was written for this exact layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let expected_hash = layout_hash();
    if version == FEATURE_VERSION && hash == expected_hash {
        return Ok(());
    }

    Err(LayoutMismatchError {
        expected_version: FEATURE_VERSION,
        expected_hash,
        found_version: version,
        found_hash: hash,
    })
}

// ============================================================================
// LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Owned copy of the layout, for metadata and model artifacts
pub fn feature_names() -> Vec<String> {
    FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
}

/// Owned copy of the class labels
pub fn class_labels() -> Vec<String> {
    CLASS_LABELS.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 30);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_DESCRIPTIONS.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_names_are_unique() {
        let mut names: Vec<_> = FEATURE_LAYOUT.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());

        let err = validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).unwrap_err();
        assert_eq!(err.expected_hash, layout_hash());
        assert_eq!(err.found_hash, layout_hash().wrapping_add(1));
        assert!(err.to_string().contains("feature layout v1"));
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("feature_1"), Some(0));
        assert_eq!(feature_index("feature_30"), Some(29));
        assert_eq!(feature_index("feature_0"), None);
    }
}
