//! Heatmap prediction of anchor images against a single match image.

use super::{copy_output, forward_batch, plan_batches};
use crate::core::batch::{ImageDims, single_sample_view};
use crate::core::config::ModelConfig;
use crate::core::errors::InferError;
use crate::core::inference::{OrtModel, TensorInput};
use crate::core::stats::{CallTimings, InferenceStats, StatsManager};
use crate::core::traits::ModelService;
use std::path::Path;
use std::time::Instant;

/// Model outputs in their positional order.
const HEATMAP_OUTPUT: usize = 0;
const OCCLUSION_OUTPUT: usize = 1;
const DEPTH_OUTPUT: usize = 2;
const NUM_OUTPUTS: usize = 3;

/// Heatmaps and per-sample scores for every anchor of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOutput {
    /// Flat `[n_samples, height, width]` heatmap buffer.
    pub heatmap: Vec<f32>,
    /// One occlusion score per sample.
    pub occlusion_scores: Vec<f32>,
    /// One depth score per sample.
    pub depth_scores: Vec<f32>,
    /// Number of samples processed.
    pub n_samples: usize,
    /// Geometry of the input images.
    pub dims: ImageDims,
}

impl HeatmapOutput {
    /// Heatmap of sample `index`, if it exists.
    pub fn sample_heatmap(&self, index: usize) -> Option<&[f32]> {
        let len = self.dims.pixels();
        self.heatmap.get(index * len..(index + 1) * len)
    }
}

/// Batched heatmap predictor.
///
/// Each forward pass receives an anchor batch shaped
/// `[batch, channels, height, width]` and the match image shaped
/// `[1, channels, height, width]`, and returns `(heatmap, occlusion, depth)`.
#[derive(Debug)]
pub struct HeatmapInference<M = OrtModel> {
    model: M,
    stats: StatsManager,
}

impl HeatmapInference<OrtModel> {
    /// Loads the heatmap model from `model_path` with automatic device selection.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, InferError> {
        Ok(Self::with_model(OrtModel::load(model_path)?))
    }

    /// Loads the heatmap model using a full [`ModelConfig`].
    pub fn from_config(config: &ModelConfig) -> Result<Self, InferError> {
        Ok(Self::with_model(OrtModel::from_config(config)?))
    }
}

impl<M: ModelService> HeatmapInference<M> {
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

    /// Predicts heatmaps and scores for every anchor against `match_image`.
    ///
    /// `match_image` must hold exactly one sample; the same view is passed to
    /// every forward pass.
    pub fn predict(
        &self,
        anchor: &[f32],
        match_image: &[f32],
        dims: ImageDims,
        batch_size: usize,
    ) -> Result<HeatmapOutput, InferError> {
        let model_name = self.model.model_name();
        let span = tracing::debug_span!(
            "heatmap_predict",
            model = model_name,
            samples = tracing::field::Empty,
            batch_size
        );
        let _guard = span.enter();

        let start = Instant::now();
        let mut timings = CallTimings::default();

        let plan = plan_batches(model_name, "anchor", anchor.len(), dims, batch_size)?;
        span.record("samples", plan.n_samples());
        let match_view = single_sample_view(match_image, dims)?;

        let pixels = dims.pixels();
        let mut heatmap = vec![0.0f32; plan.n_samples() * pixels];
        let mut occlusion_scores = vec![0.0f32; plan.n_samples()];
        let mut depth_scores = vec![0.0f32; plan.n_samples()];
        timings.preprocess += start.elapsed();

        for batch in 0..plan.n_batches() {
            let phase = Instant::now();
            let inputs = [
                TensorInput::new(plan.batch_view(anchor, batch)?),
                TensorInput::new(match_view),
            ];
            timings.preprocess += phase.elapsed();

            let phase = Instant::now();
            let outputs = forward_batch(&self.model, &inputs, batch, NUM_OUTPUTS)?;
            let forward = phase.elapsed();
            timings.forward += forward;

            let phase = Instant::now();
            copy_output(
                model_name,
                &outputs[HEATMAP_OUTPUT],
                HEATMAP_OUTPUT,
                batch,
                &mut heatmap[plan.output_range(batch, pixels)],
            )?;
            copy_output(
                model_name,
                &outputs[OCCLUSION_OUTPUT],
                OCCLUSION_OUTPUT,
                batch,
                &mut occlusion_scores[plan.output_range(batch, 1)],
            )?;
            copy_output(
                model_name,
                &outputs[DEPTH_OUTPUT],
                DEPTH_OUTPUT,
                batch,
                &mut depth_scores[plan.output_range(batch, 1)],
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
            "heatmap prediction: {} samples in {} batches, preprocess {:.3} ms, forward {:.3} ms, postprocess {:.3} ms",
            plan.n_samples(),
            plan.n_batches(),
            timings.preprocess.as_secs_f64() * 1000.0,
            timings.forward.as_secs_f64() * 1000.0,
            timings.postprocess.as_secs_f64() * 1000.0
        );
        self.stats
            .record(plan.n_batches(), plan.n_samples(), timings, total);

        Ok(HeatmapOutput {
            heatmap,
            occlusion_scores,
            depth_scores,
            n_samples: plan.n_samples(),
            dims,
        })
    }
}

#[cfg(test)]
#[path = "heatmap_tests.rs"]
mod heatmap_tests;
