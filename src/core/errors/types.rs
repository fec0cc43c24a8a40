//! Core error types for batched inference.

use thiserror::Error;

/// Enum representing the errors that can occur while loading a model or
/// running batched predictions.
#[derive(Error, Debug)]
pub enum InferError {
    /// The model artifact could not be loaded.
    #[error("failed to load model '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path of the model artifact.
        model_path: String,
        /// Why loading failed.
        reason: String,
        /// Optional fix hint, already formatted with a leading separator.
        suggestion: String,
        /// The underlying runtime error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The number of samples is not a multiple of the batch size.
    #[error("number of samples ({n_samples}) needs to be a multiple of batch size ({batch_size})")]
    BatchSizeMismatch {
        /// Samples found in the primary buffer.
        n_samples: usize,
        /// Requested batch size.
        batch_size: usize,
    },

    /// A buffer does not match the length implied by the declared dimensions.
    #[error("{buffer} buffer has {actual} elements, expected {expected}")]
    BufferSizeMismatch {
        /// Which buffer is inconsistent (e.g. "target", "match").
        buffer: &'static str,
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// The model returned a tensor whose size does not fit the output slot.
    #[error(
        "model '{model_name}' output #{output_index} for batch {batch_index} has {actual} elements, expected {expected}"
    )]
    OutputSizeMismatch {
        /// Name of the model that produced the output.
        model_name: String,
        /// Position of the output in the model's output list.
        output_index: usize,
        /// Batch that produced the output.
        batch_index: usize,
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// The model returned fewer outputs than the predictor consumes.
    #[error("model '{model_name}' returned {actual} outputs for batch {batch_index}, expected {expected}")]
    MissingOutput {
        /// Name of the model.
        model_name: String,
        /// Batch that produced the outputs.
        batch_index: usize,
        /// Number of outputs consumed by the predictor.
        expected: usize,
        /// Number of outputs the model returned.
        actual: usize,
    },

    /// A forward pass failed inside the runtime.
    #[error(
        "model '{model_name}' {operation} failed at batch {batch_index} with input shape {input_shape:?}{}",
        context_suffix(.context)
    )]
    ModelInference {
        /// Name of the model.
        model_name: String,
        /// Operation that failed.
        operation: String,
        /// Index of the failing batch.
        batch_index: usize,
        /// Shape of the primary input tensor.
        input_shape: Vec<usize>,
        /// Free-form context.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor view construction.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config parse")]
    ConfigParse(#[from] serde_json::Error),
}

fn context_suffix(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(": {context}")
    }
}

impl InferError {
    /// Returns the batch index attached to a forward or output failure.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            Self::ModelInference { batch_index, .. }
            | Self::OutputSizeMismatch { batch_index, .. }
            | Self::MissingOutput { batch_index, .. } => Some(*batch_index),
            _ => None,
        }
    }

    /// True for validation failures that leave no output and can be retried
    /// with corrected arguments.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BatchSizeMismatch { .. } | Self::BufferSizeMismatch { .. } | Self::InvalidInput { .. }
        )
    }
}

impl From<crate::core::config::ConfigError> for InferError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}
