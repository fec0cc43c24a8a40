use super::*;
use crate::core::device::DevicePreference;

#[test]
fn test_load_missing_model_is_model_load_error() {
    let result = OrtModel::load("dummy_path.onnx");
    assert!(matches!(result, Err(InferError::ModelLoad { .. })));
}

#[test]
fn test_from_config_missing_model_respects_config() {
    let config = ModelConfig::new("dummy_path.onnx")
        .device(DevicePreference::Cpu)
        .ort_session(OrtSessionConfig::new().with_intra_threads(2));
    let result = OrtModel::from_config(&config);
    assert!(matches!(result, Err(InferError::ModelLoad { .. })));
}

#[test]
fn test_cpu_provider_always_registered() {
    let providers = OrtModel::build_execution_providers(Device::Cpu, true);
    assert_eq!(providers.len(), 1);
}
