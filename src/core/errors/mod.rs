//! Error types for batched inference.
//!
//! # Usage
//!
//! ```rust
//! use deform_infer::core::errors::InferError;
//!
//! let error = InferError::buffer_size_mismatch("match", 6 * 224 * 224, 42);
//! assert!(error.is_recoverable());
//!
//! let config_error = InferError::config_error("Missing required model path");
//! assert!(!config_error.is_recoverable());
//! ```

pub mod constructors;
pub mod types;

pub use constructors::ModelInferenceErrorBuilder;
pub use types::InferError;

/// Convenient result alias for inference operations.
pub type InferResult<T> = Result<T, InferError>;
