//! Flow Prediction Example
//!
//! Loads a flow model and runs it over zero-filled source/target buffers,
//! either once or repeatedly as a benchmark.
//!
//! ```bash
//! RUST_LOG=info cargo run --example flow_prediction -- -m models/flow_prediction.onnx
//! RUST_LOG=debug cargo run --example flow_prediction -- -m models/flow_prediction.onnx --iterations 10
//! ```

mod common;

use clap::Parser;
use common::{ModelArgs, report_benchmark};
use deform_infer::prelude::*;
use deform_infer::utils::init_tracing;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the flow prediction example
#[derive(Parser)]
#[command(name = "flow_prediction")]
#[command(about = "Flow Prediction Example - dense flow between image pairs")]
struct Args {
    #[command(flatten)]
    model: ModelArgs,

    /// Number of source/target pairs
    #[arg(short, long, default_value_t = 20)]
    num_samples: usize,

    /// Image width
    #[arg(long, default_value_t = 640)]
    width: usize,

    /// Image height
    #[arg(long, default_value_t = 480)]
    height: usize,

    /// Channels per image
    #[arg(long, default_value_t = 6)]
    channels: usize,

    /// Samples per forward pass
    #[arg(short, long, default_value_t = 10)]
    batch_size: usize,

    /// Number of predictions to run; more than one reports benchmark timings
    #[arg(short, long, default_value_t = 1)]
    iterations: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    info!("Flow Prediction Example");

    let config = args.model.model_config()?;
    let flow = FlowInference::from_config(&config)?;

    let dims = ImageDims::new(args.width, args.height, args.channels);
    let source = vec![0.0f32; args.num_samples * dims.sample_len()];
    let target = vec![0.0f32; args.num_samples * dims.sample_len()];

    let start = Instant::now();
    let mut last = None;
    for _ in 0..args.iterations {
        match flow.predict(&source, &target, dims, args.batch_size) {
            Ok(output) => last = Some(output),
            Err(e) => {
                error!("Flow prediction failed: {}", e);
                return Err(e.into());
            }
        }
    }
    let elapsed = start.elapsed();

    if let Some(output) = last {
        info!(
            "Predicted flow for {} samples ({} floats)",
            output.n_samples,
            output.flow.len()
        );
    }
    if args.iterations > 1 {
        report_benchmark("Flow benchmark", args.iterations, elapsed);
    }

    let stats = flow.stats();
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
