//! Features Module - Feature Schema & Input Validation
//!
//! Keeps the feature contract in one place so training and serving can never
//! disagree on names or order.

pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{
    class_labels, feature_names, layout_hash, validate_layout, LayoutMismatchError,
    CLASS_LABELS, FEATURE_COUNT, FEATURE_DESCRIPTIONS, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use vector::{FeatureVector, FieldIssue};
