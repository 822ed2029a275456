//! Request and response schemas

pub mod health;
pub mod model_info;
pub mod prediction;

pub use health::*;
pub use model_info::*;
pub use prediction::*;
