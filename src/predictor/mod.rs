//! Batched predictors built on a [`ModelService`].
//!
//! * [`FlowInference`] - dense optical flow between source/target image pairs
//! * [`HeatmapInference`] - per-anchor heatmaps plus occlusion and depth scores
//!   against a single broadcast match image

pub mod flow;
pub mod heatmap;

#[cfg(test)]
pub(crate) mod test_support;

pub use flow::{FLOW_COMPONENTS, FlowInference, FlowOutput};
pub use heatmap::{HeatmapInference, HeatmapOutput};

use crate::core::batch::{BatchPlan, ImageDims};
use crate::core::errors::InferError;
use crate::core::inference::{TensorInput, TensorOutput};
use crate::core::traits::ModelService;

/// Plans the batches for the primary buffer, reporting rejected batch sizes.
pub(crate) fn plan_batches(
    model_name: &str,
    buffer: &'static str,
    buffer_len: usize,
    dims: ImageDims,
    batch_size: usize,
) -> Result<BatchPlan, InferError> {
    BatchPlan::for_buffer(buffer, buffer_len, dims, batch_size).inspect_err(|e| {
        if matches!(e, InferError::BatchSizeMismatch { .. }) {
            tracing::warn!("{}: {}", model_name, e);
        }
    })
}

/// Runs one forward pass and checks that enough outputs came back.
///
/// Runtime failures are wrapped with the batch index and input shape.
pub(crate) fn forward_batch<M: ModelService + ?Sized>(
    model: &M,
    inputs: &[TensorInput<'_>],
    batch_index: usize,
    expected_outputs: usize,
) -> Result<Vec<TensorOutput>, InferError> {
    let outputs = model.forward(inputs).map_err(|e| {
        InferError::model_inference_error_builder(model.model_name(), "forward")
            .batch_index(batch_index)
            .input_shape(inputs.first().map(|i| i.shape()).unwrap_or(&[]))
            .context(format!("on {}", model.device()))
            .build(e)
    })?;

    if outputs.len() < expected_outputs {
        return Err(InferError::MissingOutput {
            model_name: model.model_name().to_string(),
            batch_index,
            expected: expected_outputs,
            actual: outputs.len(),
        });
    }
    Ok(outputs)
}

/// Copies one model output into its slot of a flat result buffer.
pub(crate) fn copy_output(
    model_name: &str,
    output: &TensorOutput,
    output_index: usize,
    batch_index: usize,
    dst: &mut [f32],
) -> Result<(), InferError> {
    if output.len() != dst.len() {
        return Err(InferError::OutputSizeMismatch {
            model_name: model_name.to_string(),
            output_index,
            batch_index,
            expected: dst.len(),
            actual: output.len(),
        });
    }
    dst.copy_from_slice(&output.data);
    Ok(())
}
