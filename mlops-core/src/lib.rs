//! MLOps Core - Training Pipeline & Model Runtime
//!
//! Everything the prediction service needs from the training side lives here:
//!
//! ```text
//! configs.yaml ─▶ config ─▶ dataset ─▶ training ─▶ model.json + metadata.json
//!                                         │
//!                                         └──▶ tracking (MLflow / local store)
//! ```
//!
//! - `logic::features` - the 30-feature wire layout and validated vectors
//! - `logic::dataset` - bundled breast cancer data, CSV loader, stratified split
//! - `logic::model` - scaler, random forest, pipeline, metadata
//! - `logic::training` - fit, evaluate, write artifacts
//! - `logic::tracking` - experiment tracking backends

pub mod constants;
pub mod logic;

pub use logic::features::{FeatureVector, FieldIssue, FEATURE_COUNT, FEATURE_LAYOUT};
pub use logic::model::{Classifier, ModelMetadata, Pipeline, Prediction};
