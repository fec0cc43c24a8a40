//! Common utilities for the demos.
//!
//! Shared argument handling: model loading options and the benchmark loop
//! settings used by both predictors.

use clap::Args;
use deform_infer::core::{ConfigValidator, DevicePreference, ModelConfig, OrtSessionConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Model loading options shared by the demos.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Path to the ONNX model file
    #[arg(short, long)]
    pub model_path: Option<PathBuf>,

    /// JSON model configuration; overrides the other model options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Device to run on (auto, cpu, cuda, cuda:N)
    #[arg(short, long, default_value = "auto")]
    pub device: String,

    /// Disable exhaustive cuDNN convolution algorithm search
    #[arg(long)]
    pub no_cudnn_benchmark: bool,

    /// Intra-op thread count for the ONNX Runtime session
    #[arg(long)]
    pub threads: Option<usize>,
}

impl ModelArgs {
    /// Builds and validates the model configuration from the arguments.
    pub fn model_config(&self) -> Result<ModelConfig, Box<dyn std::error::Error>> {
        let config = match (&self.config, &self.model_path) {
            (Some(path), _) => {
                info!("Loading model configuration from {}", path.display());
                ModelConfig::from_json_file(path)?
            }
            (None, Some(model_path)) => {
                let mut config = ModelConfig::new(model_path)
                    .device(parse_device(&self.device)?)
                    .cudnn_benchmark(!self.no_cudnn_benchmark);
                if let Some(threads) = self.threads {
                    config = config.ort_session(OrtSessionConfig::new().with_intra_threads(threads));
                }
                config
            }
            (None, None) => return Err("either --model-path or --config is required".into()),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parses a device string such as "cpu", "cuda" or "cuda:1".
pub fn parse_device(device: &str) -> Result<DevicePreference, Box<dyn std::error::Error>> {
    device
        .parse::<DevicePreference>()
        .map_err(|e| format!("Unsupported device: {device} ({e}). Supported devices: auto, cpu, cuda, cuda:N").into())
}

/// Logs the wall time of a benchmark run.
pub fn report_benchmark(name: &str, iterations: usize, elapsed: Duration) {
    let total_ms = elapsed.as_secs_f64() * 1000.0;
    info!(
        "{}: {} iterations in {:.2} ms ({:.2} ms per iteration)",
        name,
        iterations,
        total_ms,
        total_ms / iterations.max(1) as f64
    );
}
