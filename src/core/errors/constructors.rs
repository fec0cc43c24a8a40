//! Error constructor helpers.
//!
//! These keep call sites short and make the messages consistent between the
//! flow and heatmap predictors.
//!
//! ```rust
//! use deform_infer::core::InferError;
//!
//! let error = InferError::model_inference_error_builder("flow_prediction", "forward")
//!     .batch_index(3)
//!     .input_shape(&[10, 6, 480, 640])
//!     .build(std::io::Error::other("device lost"));
//! assert_eq!(error.batch_index(), Some(3));
//! ```

use super::types::InferError;

/// Builder for composing detailed `ModelInference` errors.
#[derive(Clone, Debug)]
pub struct ModelInferenceErrorBuilder {
    model_name: String,
    operation: String,
    batch_index: usize,
    input_shape: Vec<usize>,
    context: String,
}

impl ModelInferenceErrorBuilder {
    /// Creates a new builder with the required model metadata.
    pub fn new(model_name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            operation: operation.into(),
            batch_index: 0,
            input_shape: Vec::new(),
            context: String::new(),
        }
    }

    /// Sets the batch index associated with the failure.
    pub fn batch_index(mut self, batch_index: usize) -> Self {
        self.batch_index = batch_index;
        self
    }

    /// Stores the input tensor shape for contextual debugging.
    pub fn input_shape(mut self, shape: &[usize]) -> Self {
        self.input_shape = shape.to_vec();
        self
    }

    /// Adds free-form context to the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Consumes the builder and produces the final `InferError`.
    pub fn build(self, error: impl std::error::Error + Send + Sync + 'static) -> InferError {
        InferError::ModelInference {
            model_name: self.model_name,
            operation: self.operation,
            batch_index: self.batch_index,
            input_shape: self.input_shape,
            context: self.context,
            source: Box::new(error),
        }
    }
}

impl InferError {
    /// Creates an error for a model that could not be loaded.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path of the artifact.
    /// * `reason` - Short description of the failure.
    /// * `suggestion` - Optional fix hint appended to the message.
    /// * `source` - The underlying runtime error, if any.
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Starts a `ModelInference` error for the given model and operation.
    pub fn model_inference_error_builder(
        model_name: impl Into<String>,
        operation: impl Into<String>,
    ) -> ModelInferenceErrorBuilder {
        ModelInferenceErrorBuilder::new(model_name, operation)
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for configuration problems.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates an error for a buffer whose length disagrees with the declared
    /// image dimensions.
    pub fn buffer_size_mismatch(buffer: &'static str, expected: usize, actual: usize) -> Self {
        Self::BufferSizeMismatch {
            buffer,
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_load_error_formats_suggestion() {
        let err = InferError::model_load_error(
            "models/flow.onnx",
            "file not found",
            Some("check the path"),
            None::<std::io::Error>,
        );
        let msg = err.to_string();
        assert!(msg.contains("models/flow.onnx"));
        assert!(msg.contains("suggested fix: check the path"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_model_inference_builder_carries_batch_index() {
        let err = InferError::model_inference_error_builder("heatmap", "forward")
            .batch_index(2)
            .input_shape(&[4, 6, 224, 224])
            .context("out of memory")
            .build(std::io::Error::other("cuda"));
        assert_eq!(err.batch_index(), Some(2));
        let msg = err.to_string();
        assert!(msg.contains("batch 2"));
        assert!(msg.contains("[4, 6, 224, 224]"));
        assert!(msg.contains("out of memory"));
    }

    #[test]
    fn test_validation_errors_are_recoverable() {
        assert!(InferError::buffer_size_mismatch("target", 12, 6).is_recoverable());
        assert!(
            InferError::BatchSizeMismatch {
                n_samples: 3,
                batch_size: 2
            }
            .is_recoverable()
        );
        assert!(InferError::invalid_input("zero batch").is_recoverable());
    }
}
