//! # Deform Infer
//!
//! Batched optical flow and heatmap inference over ONNX models.
//!
//! Callers hand over flat `f32` buffers holding many same-sized images. The
//! predictors split them into fixed-size batches, pass zero-copy tensor views
//! to the model, and gather the per-batch results into flat output buffers.
//!
//! ## Components
//!
//! - **Flow prediction**: dense 2-component flow between source and target images
//! - **Heatmap prediction**: per-anchor heatmap, occlusion score and depth score
//!   against one match image
//!
//! ## Modules
//!
//! * [`core`] - Batch planning, configuration, devices, errors and the ONNX Runtime service
//! * [`predictor`] - The flow and heatmap predictors
//! * [`utils`] - Logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deform_infer::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ModelConfig::new("models/heatmap_prediction.onnx")
//!     .device(DevicePreference::Auto)
//!     .cudnn_benchmark(true);
//! let heatmap = HeatmapInference::from_config(&config)?;
//!
//! let dims = ImageDims::new(224, 224, 6);
//! let anchors = vec![0.0f32; 96 * dims.sample_len()];
//! let match_image = vec![0.0f32; dims.sample_len()];
//!
//! let output = heatmap.predict(&anchors, &match_image, dims, 96)?;
//! println!("depth scores: {:?}", &output.depth_scores[..4]);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod predictor;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use deform_infer::prelude::*;
/// ```
///
/// Included items cover the common path: the predictors and their outputs,
/// image geometry, model configuration and the error type. For custom model
/// services import [`core::traits::ModelService`] directly.
pub mod prelude {
    // Predictors
    pub use crate::predictor::{
        FlowInference, FlowOutput, HeatmapInference, HeatmapOutput,
    };

    // Inputs and configuration
    pub use crate::core::{DevicePreference, ImageDims, ModelConfig, OrtSessionConfig};

    // Error handling
    pub use crate::core::{InferError, InferResult};
}
