//! Request middleware and extractors

pub mod extract;
pub mod metrics;

pub use extract::AppJson;
pub use metrics::track_requests;
