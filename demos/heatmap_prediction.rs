//! Heatmap Prediction Example
//!
//! Loads a heatmap model and runs it over zero-filled anchor images against a
//! single zero-filled match image, either once or repeatedly as a benchmark.
//!
//! ```bash
//! RUST_LOG=info cargo run --example heatmap_prediction -- -m models/heatmap_prediction.onnx
//! RUST_LOG=info cargo run --example heatmap_prediction -- -m models/heatmap_prediction.onnx --iterations 10
//! ```

mod common;

use clap::Parser;
use common::{ModelArgs, report_benchmark};
use deform_infer::prelude::*;
use deform_infer::utils::init_tracing;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the heatmap prediction example
#[derive(Parser)]
#[command(name = "heatmap_prediction")]
#[command(about = "Heatmap Prediction Example - anchor heatmaps with occlusion and depth scores")]
struct Args {
    #[command(flatten)]
    model: ModelArgs,

    /// Number of anchor images (defaults to three batches)
    #[arg(short, long)]
    num_samples: Option<usize>,

    /// Image width
    #[arg(long, default_value_t = 224)]
    width: usize,

    /// Image height
    #[arg(long, default_value_t = 224)]
    height: usize,

    /// Channels per image
    #[arg(long, default_value_t = 6)]
    channels: usize,

    /// Samples per forward pass
    #[arg(short, long, default_value_t = 96)]
    batch_size: usize,

    /// Number of predictions to run; more than one reports benchmark timings
    #[arg(short, long, default_value_t = 1)]
    iterations: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    info!("Heatmap Prediction Example");

    let config = args.model.model_config()?;
    let heatmap = HeatmapInference::from_config(&config)?;

    let dims = ImageDims::new(args.width, args.height, args.channels);
    let num_samples = args.num_samples.unwrap_or(3 * args.batch_size);
    let anchors = vec![0.0f32; num_samples * dims.sample_len()];
    let match_image = vec![0.0f32; dims.sample_len()];

    let start = Instant::now();
    let mut last = None;
    for _ in 0..args.iterations {
        match heatmap.predict(&anchors, &match_image, dims, args.batch_size) {
            Ok(output) => last = Some(output),
            Err(e) => {
                error!("Heatmap prediction failed: {}", e);
                return Err(e.into());
            }
        }
    }
    let elapsed = start.elapsed();

    if let Some(output) = last {
        info!(
            "Predicted {} heatmaps ({} floats)",
            output.n_samples,
            output.heatmap.len()
        );
        for (i, (occlusion, depth)) in output
            .occlusion_scores
            .iter()
            .zip(&output.depth_scores)
            .take(5)
            .enumerate()
        {
            info!("   {}. occlusion {:.4}, depth {:.4}", i + 1, occlusion, depth);
        }
    }
    if args.iterations > 1 {
        report_benchmark("Heatmap benchmark", args.iterations, elapsed);
    }

    let stats = heatmap.stats();
    info!(
        "Stats: {} calls, {} batches, {} samples, forward {:.2} ms, average call {:.2} ms",
        stats.calls,
        stats.batches,
        stats.samples,
        stats.forward_ms,
        stats.average_call_ms()
    );

    info!("Example completed!");
    Ok(())
}
