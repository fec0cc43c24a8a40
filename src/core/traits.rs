//! The model service seam between the batching layer and the runtime.

use crate::core::device::Device;
use crate::core::errors::InferError;
use crate::core::inference::{TensorInput, TensorOutput};
use std::fmt::Debug;

/// A loaded network that evaluates batches without gradient tracking.
///
/// Implementations are loaded once and then called once per batch. The
/// device binding is fixed for the lifetime of the service.
pub trait ModelService: Send + Sync + Debug {
    /// Runs one forward pass.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Positional model inputs.
    ///
    /// # Returns
    ///
    /// All model outputs in the model's declared order.
    fn forward(&self, inputs: &[TensorInput<'_>]) -> Result<Vec<TensorOutput>, InferError>;

    /// The device the model is bound to.
    fn device(&self) -> Device;

    /// Name used in logs and errors.
    fn model_name(&self) -> &str;
}

impl<M: ModelService + ?Sized> ModelService for Box<M> {
    fn forward(&self, inputs: &[TensorInput<'_>]) -> Result<Vec<TensorOutput>, InferError> {
        (**self).forward(inputs)
    }

    fn device(&self) -> Device {
        (**self).device()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
