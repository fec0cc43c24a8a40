//! ONNX Runtime backed model service.

use super::session;
use super::tensor::{TensorInput, TensorOutput};
use crate::core::config::{ModelConfig, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::device::{Device, select_device};
use crate::core::errors::InferError;
use crate::core::traits::ModelService;
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::{Session, SessionInputs, builder::SessionBuilder};
use ort::value::TensorRef;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(test)]
#[path = "ort_model_tests.rs"]
mod ort_model_tests;

/// A model loaded into an ONNX Runtime session and bound to one device.
pub struct OrtModel {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
    device: Device,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtModel")
            .field("input_names", &self.input_names)
            .field("output_names", &self.output_names)
            .field("device", &self.device)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtModel {
    /// Loads a model with automatic device selection and default session settings.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferError> {
        Self::from_config(&ModelConfig::new(model_path.as_ref()))
    }

    /// Loads a model using the full configuration.
    pub fn from_config(config: &ModelConfig) -> Result<Self, InferError> {
        let path = config.model_path.as_path();
        let model_name = config.resolved_model_name();
        let device = select_device(config.device);
        if device.is_gpu() {
            tracing::debug!(
                "cuDNN exhaustive convolution search: {}",
                config.cudnn_benchmark
            );
        }

        let session = session::load_session_with(
            path,
            |builder| Self::configure_builder(builder, config, device),
            Some("check device/EP configuration and model file"),
        )?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        tracing::info!(
            "Loaded model '{}' from {} on {} (inputs: {:?}, outputs: {:?})",
            model_name,
            path.display(),
            device,
            input_names,
            output_names
        );

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
            device,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model path associated with this model.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Names of the model inputs, in positional order.
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Names of the model outputs, in the order `forward` returns them.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn configure_builder(
        builder: SessionBuilder,
        config: &ModelConfig,
        device: Device,
    ) -> Result<SessionBuilder, ort::Error> {
        let mut builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(cfg) = &config.ort_session {
            builder = Self::apply_ort_config(builder, cfg)?;
        }
        let providers = Self::build_execution_providers(device, config.cudnn_benchmark);
        builder.with_execution_providers(providers)
    }

    fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(level) = cfg.optimization_level {
            use ort::session::builder::GraphOptimizationLevel as GOL;
            let mapped = match level {
                OrtGraphOptimizationLevel::DisableAll => GOL::Disable,
                OrtGraphOptimizationLevel::Level1 => GOL::Level1,
                OrtGraphOptimizationLevel::Level2 => GOL::Level2,
                OrtGraphOptimizationLevel::Level3 => GOL::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        if let Some(enable) = cfg.enable_mem_pattern {
            builder = builder.with_memory_pattern(enable)?;
        }
        Ok(builder)
    }

    /// The CPU provider is always registered last as a fallback.
    #[cfg_attr(not(feature = "cuda"), allow(unused_variables))]
    fn build_execution_providers(
        device: Device,
        cudnn_benchmark: bool,
    ) -> Vec<ExecutionProviderDispatch> {
        let mut providers = Vec::with_capacity(2);

        #[cfg(feature = "cuda")]
        if let Device::Cuda { device_id } = device {
            use ort::execution_providers::CUDAExecutionProvider;
            use ort::execution_providers::cuda::CuDNNConvAlgorithmSearch;

            let mut cuda = CUDAExecutionProvider::default().with_device_id(device_id);
            if cudnn_benchmark {
                cuda = cuda.with_conv_algorithm_search(CuDNNConvAlgorithmSearch::Exhaustive);
            }
            providers.push(cuda.build());
        }

        providers.push(ort::execution_providers::CPUExecutionProvider::default().build());
        providers
    }
}

impl ModelService for OrtModel {
    fn forward(&self, inputs: &[TensorInput<'_>]) -> Result<Vec<TensorOutput>, InferError> {
        if inputs.len() != self.input_names.len() {
            return Err(InferError::invalid_input(format!(
                "Model '{}' expects {} inputs ({}), got {}",
                self.model_name,
                self.input_names.len(),
                self.input_names.join(", "),
                inputs.len()
            )));
        }

        let tensor_refs = inputs
            .iter()
            .zip(&self.input_names)
            .map(|(input, name)| {
                let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
                let data = input.as_slice()?;
                let tensor_ref = TensorRef::from_array_view((dims, data))?;
                Ok((Cow::Borrowed(name.as_str()), tensor_ref.into()))
            })
            .collect::<Result<Vec<_>, InferError>>()?;

        let mut session_guard = self.session.lock().map_err(|_| {
            InferError::invalid_input(format!(
                "Model '{}': session lock poisoned by an earlier panic",
                self.model_name
            ))
        })?;

        let ort_inputs: SessionInputs<'_, '_, 0> = SessionInputs::ValueMap(tensor_refs);
        let outputs = session_guard.run(ort_inputs)?;

        let mut results = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let value = &outputs[name.as_str()];
            let (shape, data) = value.try_extract_tensor::<f32>().map_err(|e| {
                InferError::invalid_input(format!(
                    "Model '{}': output '{}' is not an f32 tensor: {}",
                    self.model_name, name, e
                ))
            })?;
            results.push(TensorOutput::new(
                shape.iter().copied().collect(),
                data.to_vec(),
            )?);
        }

        Ok(results)
    }

    fn device(&self) -> Device {
        self.device
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
