//! The core module of the inference library.
//!
//! This module contains the fundamental components shared by the predictors:
//! - Batch planning over flat sample buffers
//! - Configuration management
//! - Device selection
//! - Error handling
//! - ONNX Runtime integration
//! - Timing statistics
//! - The model service trait
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod batch;
pub mod config;
pub mod device;
pub mod errors;
pub mod inference;
pub mod stats;
pub mod traits;

pub use batch::{BatchPlan, ImageDims, TensorView4, single_sample_view};
pub use config::{ConfigError, ConfigValidator, ModelConfig, OrtGraphOptimizationLevel, OrtSessionConfig};
pub use device::{Device, DevicePreference, select_device};
pub use errors::{InferError, InferResult, ModelInferenceErrorBuilder};
pub use inference::{OrtModel, TensorInput, TensorOutput};
pub use stats::InferenceStats;
pub use traits::ModelService;
