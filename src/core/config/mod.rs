//! Configuration types for model loading.

pub mod errors;
pub mod model;
pub mod onnx;

pub use errors::{ConfigError, ConfigValidator};
pub use model::ModelConfig;
pub use onnx::{OrtGraphOptimizationLevel, OrtSessionConfig};
