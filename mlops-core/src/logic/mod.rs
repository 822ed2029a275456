//! Logic Module - Training & Model Runtime
//!
//! - `config` - YAML training configuration
//! - `features/` - feature layout, validated feature vectors
//! - `dataset/` - dataset loading and splitting
//! - `model/` - scaler, decision trees, random forest, pipeline, metadata
//! - `training/` - fit, evaluation, artifact writing
//! - `tracking/` - MLflow REST client and local run store

pub mod config;
pub mod features;
pub mod dataset;
pub mod model;
pub mod training;
pub mod tracking;
