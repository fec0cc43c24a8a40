//! Per-model configuration.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use crate::core::device::DevicePreference;
use crate::core::errors::InferError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_cudnn_benchmark() -> bool {
    true
}

/// Configuration for loading one model.
///
/// Can be built in code or loaded from JSON:
///
/// ```rust
/// use deform_infer::core::config::ModelConfig;
/// use deform_infer::core::device::DevicePreference;
///
/// let config: ModelConfig = serde_json::from_str(r#"
/// {
///   "model_path": "models/flow_prediction.onnx",
///   "device": "Cpu",
///   "ort_session": { "intra_threads": 4 }
/// }
/// "#).unwrap();
/// assert_eq!(config.device, DevicePreference::Cpu);
/// assert!(config.cudnn_benchmark);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The path to the ONNX model file.
    pub model_path: PathBuf,
    /// The name of the model used in logs and errors (defaults to the file stem).
    #[serde(default)]
    pub model_name: Option<String>,
    /// Requested execution device.
    #[serde(default)]
    pub device: DevicePreference,
    /// Run an exhaustive cuDNN convolution algorithm search on CUDA devices.
    #[serde(default = "default_cudnn_benchmark")]
    pub cudnn_benchmark: bool,
    /// ONNX Runtime session configuration (optional).
    #[serde(default)]
    pub ort_session: Option<OrtSessionConfig>,
}

impl ModelConfig {
    /// Creates a configuration for the given model path with default settings.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            model_name: None,
            device: DevicePreference::Auto,
            cudnn_benchmark: true,
            ort_session: None,
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, InferError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Sets the requested device.
    pub fn device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    /// Enables or disables the cuDNN algorithm search.
    pub fn cudnn_benchmark(mut self, enable: bool) -> Self {
        self.cudnn_benchmark = enable;
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }

    /// Returns the configured model name, falling back to the file stem.
    pub fn resolved_model_name(&self) -> String {
        self.model_name
            .clone()
            .or_else(|| {
                self.model_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string())
    }
}

impl ConfigValidator for ModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_model_path(&self.model_path)?;
        if let Some(session) = &self.ort_session {
            self.validate_thread_count("intra_threads", session.intra_threads)?;
            self.validate_thread_count("inter_threads", session.inter_threads)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolved_model_name() {
        let config = ModelConfig::new("data/heatmap_prediction.onnx");
        assert_eq!(config.resolved_model_name(), "heatmap_prediction");

        let named = config.model_name("heatmap");
        assert_eq!(named.resolved_model_name(), "heatmap");
    }

    #[test]
    fn test_validate_missing_model_path() {
        let config = ModelConfig::new("does/not/exist.onnx");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ModelPathNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ModelConfig::new(file.path())
            .ort_session(OrtSessionConfig::new().with_intra_threads(0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig { .. })
        ));

        let config = ModelConfig::new(file.path())
            .ort_session(OrtSessionConfig::new().with_intra_threads(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "model_path": "models/flow_prediction.onnx",
                "model_name": "flow",
                "device": {{ "Cuda": {{ "device_id": 1 }} }},
                "cudnn_benchmark": false,
                "ort_session": {{ "intra_threads": 2, "optimization_level": "Level2" }}
            }}"#
        )
        .unwrap();

        let config = ModelConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.model_name.as_deref(), Some("flow"));
        assert_eq!(config.device, DevicePreference::Cuda { device_id: 1 });
        assert!(!config.cudnn_benchmark);
        let session = config.ort_session.unwrap();
        assert_eq!(session.intra_threads, Some(2));
        assert_eq!(
            session.get_optimization_level(),
            crate::core::config::OrtGraphOptimizationLevel::Level2
        );
    }

    #[test]
    fn test_from_json_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ModelConfig::from_json_file(file.path()),
            Err(InferError::ConfigParse(_))
        ));
    }
}
