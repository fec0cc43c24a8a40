//! Dense optical flow prediction over batches of image pairs.

use super::{copy_output, forward_batch, plan_batches};
use crate::core::batch::ImageDims;
use crate::core::config::ModelConfig;
use crate::core::errors::InferError;
use crate::core::inference::{OrtModel, TensorInput};
use crate::core::stats::{CallTimings, InferenceStats, StatsManager};
use crate::core::traits::ModelService;
use std::path::Path;
use std::time::Instant;

/// Number of flow components per pixel (dx, dy).
pub const FLOW_COMPONENTS: usize = 2;

/// Flow fields for every sample of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutput {
    /// Flat `[n_samples, 2, height, width]` flow buffer.
    pub flow: Vec<f32>,
    /// Number of samples processed.
    pub n_samples: usize,
    /// Geometry of the input images.
    pub dims: ImageDims,
}

impl FlowOutput {
    /// Number of floats produced per sample.
    pub fn per_sample(&self) -> usize {
        FLOW_COMPONENTS * self.dims.pixels()
    }

    /// Flow field of sample `index`, if it exists.
    pub fn sample(&self, index: usize) -> Option<&[f32]> {
        let len = self.per_sample();
        self.flow.get(index * len..(index + 1) * len)
    }
}

/// Batched optical flow predictor.
///
/// The wrapped model takes a source and a target batch, each shaped
/// `[batch, channels, height, width]`, and returns one tensor holding
/// `batch * 2 * height * width` floats.
///
/// # Example
///
/// ```rust,no_run
/// use deform_infer::prelude::*;
///
/// let flow = FlowInference::new("models/flow_prediction.onnx")?;
/// let dims = ImageDims::new(640, 480, 6);
/// let source = vec![0.0f32; 20 * dims.sample_len()];
/// let target = vec![0.0f32; 20 * dims.sample_len()];
///
/// let output = flow.predict(&source, &target, dims, 10)?;
/// assert_eq!(output.flow.len(), 20 * 2 * 640 * 480);
/// # Ok::<(), deform_infer::core::InferError>(())
/// ```
#[derive(Debug)]
pub struct FlowInference<M = OrtModel> {
    model: M,
    stats: StatsManager,
}

impl FlowInference<OrtModel> {
    /// Loads the flow model from `model_path` with automatic device selection.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, InferError> {
        Ok(Self::with_model(OrtModel::load(model_path)?))
    }

    /// Loads the flow model using a full [`ModelConfig`].
    pub fn from_config(config: &ModelConfig) -> Result<Self, InferError> {
        Ok(Self::with_model(OrtModel::from_config(config)?))
    }
}

impl<M: ModelService> FlowInference<M> {
    /// Wraps an already loaded model service.
    pub fn with_model(model: M) -> Self {
        Self {
            model,
            stats: StatsManager::new(),
        }
    }

    /// The wrapped model service.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Snapshot of the accumulated timing statistics.
    pub fn stats(&self) -> InferenceStats {
        self.stats.get_stats()
    }

    /// Clears the accumulated timing statistics.
    pub fn reset_stats(&self) {
        self.stats.reset_stats();
    }

    /// Predicts the flow from every source sample to its target sample.
    ///
    /// # Arguments
    ///
    /// * `source` - Flat source images, `n_samples * dims.sample_len()` floats.
    /// * `target` - Flat target images, same length as `source`.
    /// * `dims` - Per-sample geometry.
    /// * `batch_size` - Samples per forward pass; must divide `n_samples`.
    ///
    /// # Errors
    ///
    /// Validation failures (`InvalidInput`, `BufferSizeMismatch`,
    /// `BatchSizeMismatch`) are returned before any forward pass. Forward and
    /// copy-back failures carry the index of the failing batch.
    pub fn predict(
        &self,
        source: &[f32],
        target: &[f32],
        dims: ImageDims,
        batch_size: usize,
    ) -> Result<FlowOutput, InferError> {
        let model_name = self.model.model_name();
        let span = tracing::debug_span!(
            "flow_predict",
            model = model_name,
            samples = tracing::field::Empty,
            batch_size
        );
        let _guard = span.enter();

        let start = Instant::now();
        let mut timings = CallTimings::default();

        let plan = plan_batches(model_name, "source", source.len(), dims, batch_size)?;
        span.record("samples", plan.n_samples());
        if target.len() != source.len() {
            return Err(InferError::buffer_size_mismatch(
                "target",
                source.len(),
                target.len(),
            ));
        }

        let per_sample = dims.pixels().checked_mul(FLOW_COMPONENTS).ok_or_else(|| {
            InferError::invalid_input(format!(
                "flow output for {}x{} images would cause integer overflow",
                dims.width, dims.height
            ))
        })?;
        let mut flow = vec![0.0f32; plan.n_samples() * per_sample];
        timings.preprocess += start.elapsed();

        for batch in 0..plan.n_batches() {
            let phase = Instant::now();
            let inputs = [
                TensorInput::new(plan.batch_view(source, batch)?),
                TensorInput::new(plan.batch_view(target, batch)?),
            ];
            timings.preprocess += phase.elapsed();

            let phase = Instant::now();
            let outputs = forward_batch(&self.model, &inputs, batch, 1)?;
            let forward = phase.elapsed();
            timings.forward += forward;

            let phase = Instant::now();
            copy_output(
                model_name,
                &outputs[0],
                0,
                batch,
                &mut flow[plan.output_range(batch, per_sample)],
            )?;
            timings.postprocess += phase.elapsed();

            tracing::debug!(
                "batch {}/{}: forward {:.3} ms",
                batch + 1,
                plan.n_batches(),
                forward.as_secs_f64() * 1000.0
            );
        }

        let total = start.elapsed();
        tracing::debug!(
            "flow prediction: {} samples in {} batches, preprocess {:.3} ms, forward {:.3} ms, postprocess {:.3} ms",
            plan.n_samples(),
            plan.n_batches(),
            timings.preprocess.as_secs_f64() * 1000.0,
            timings.forward.as_secs_f64() * 1000.0,
            timings.postprocess.as_secs_f64() * 1000.0
        );
        self.stats
            .record(plan.n_batches(), plan.n_samples(), timings, total);

        Ok(FlowOutput {
            flow,
            n_samples: plan.n_samples(),
            dims,
        })
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod flow_tests;
