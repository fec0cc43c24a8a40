//! Execution device selection.
//!
//! The device is resolved once when a model is loaded and never changes
//! afterwards. Accelerator probing goes through ONNX Runtime's CUDA execution
//! provider, which is only compiled in with the `cuda` feature.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The device a model's weights and inputs are resident on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Device {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference on the given device
    Cuda {
        /// CUDA device ordinal
        device_id: i32,
    },
}

impl Device {
    /// Check if this device is an accelerator.
    pub fn is_gpu(&self) -> bool {
        matches!(self, Device::Cuda { .. })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda { device_id } => write!(f, "cuda:{}", device_id),
        }
    }
}

/// Requested placement for a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DevicePreference {
    /// Use the first CUDA device when available, otherwise the CPU.
    #[default]
    Auto,
    /// Always run on the CPU.
    Cpu,
    /// Run on a specific CUDA device, falling back to the CPU if CUDA is unavailable.
    Cuda {
        /// CUDA device ordinal
        device_id: i32,
    },
}

impl DevicePreference {
    /// Resolves the preference against the accelerators present on this host.
    pub fn resolve(self) -> Device {
        self.resolve_with(cuda_available())
    }

    fn resolve_with(self, cuda_available: bool) -> Device {
        match self {
            DevicePreference::Cpu => Device::Cpu,
            DevicePreference::Auto if cuda_available => Device::Cuda { device_id: 0 },
            DevicePreference::Auto => Device::Cpu,
            DevicePreference::Cuda { device_id } if cuda_available => Device::Cuda { device_id },
            DevicePreference::Cuda { device_id } => {
                tracing::warn!(
                    "CUDA device {} requested but CUDA is not available, falling back to CPU",
                    device_id
                );
                Device::Cpu
            }
        }
    }
}

impl std::str::FromStr for DevicePreference {
    type Err = String;

    /// Parses `auto`, `cpu`, `cuda` or `cuda:<id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda { device_id: 0 }),
            other => {
                let id = other
                    .strip_prefix("cuda:")
                    .ok_or_else(|| format!("unknown device '{}'", other))?;
                let device_id = id
                    .parse::<i32>()
                    .map_err(|_| format!("invalid CUDA device id '{}'", id))?;
                Ok(DevicePreference::Cuda { device_id })
            }
        }
    }
}

/// Resolves `preference` and reports the choice.
///
/// Emits the accelerator/cuDNN availability diagnostics once per model load.
pub fn select_device(preference: DevicePreference) -> Device {
    let cuda_available = cuda_available();
    let device = preference.resolve_with(cuda_available);
    report_device(device, cuda_available);
    device
}

/// Logs the device choice. Returns true if the cuDNN warning was emitted.
///
/// The warning depends on the host, not on the preference, so an explicit
/// CPU request on a CUDA host stays quiet.
fn report_device(device: Device, cuda_available: bool) -> bool {
    match device {
        Device::Cuda { device_id } => {
            tracing::info!("CUDA available! Inference on GPU (device {})", device_id);
        }
        Device::Cpu => tracing::info!("Inference on CPU"),
    }
    if !cuda_available {
        tracing::warn!("cuDNN not available. Memory will be limited.");
    }
    !cuda_available
}

#[cfg(feature = "cuda")]
fn cuda_available() -> bool {
    use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};

    match CUDAExecutionProvider::default().is_available() {
        Ok(available) => available,
        Err(e) => {
            tracing::debug!("CUDA availability probe failed: {}", e);
            false
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn cuda_available() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_prefers_cuda_when_available() {
        assert_eq!(
            DevicePreference::Auto.resolve_with(true),
            Device::Cuda { device_id: 0 }
        );
        assert_eq!(DevicePreference::Auto.resolve_with(false), Device::Cpu);
    }

    #[test]
    fn test_explicit_cuda_falls_back_to_cpu() {
        let pref = DevicePreference::Cuda { device_id: 1 };
        assert_eq!(pref.resolve_with(true), Device::Cuda { device_id: 1 });
        assert_eq!(pref.resolve_with(false), Device::Cpu);
    }

    #[test]
    fn test_cpu_ignores_accelerator() {
        assert_eq!(DevicePreference::Cpu.resolve_with(true), Device::Cpu);
    }

    #[test]
    fn test_cudnn_warning_follows_host_availability() {
        assert!(!report_device(DevicePreference::Cpu.resolve_with(true), true));
        assert!(!report_device(Device::Cuda { device_id: 0 }, true));
        assert!(report_device(DevicePreference::Auto.resolve_with(false), false));
        assert!(report_device(
            DevicePreference::Cuda { device_id: 1 }.resolve_with(false),
            false
        ));
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_select_device_without_cuda_feature() {
        assert_eq!(select_device(DevicePreference::Auto), Device::Cpu);
    }

    #[test]
    fn test_parse_device_preference() {
        assert_eq!("auto".parse::<DevicePreference>(), Ok(DevicePreference::Auto));
        assert_eq!("CPU".parse::<DevicePreference>(), Ok(DevicePreference::Cpu));
        assert_eq!(
            "cuda".parse::<DevicePreference>(),
            Ok(DevicePreference::Cuda { device_id: 0 })
        );
        assert_eq!(
            "cuda:2".parse::<DevicePreference>(),
            Ok(DevicePreference::Cuda { device_id: 2 })
        );
        assert!("cuda:x".parse::<DevicePreference>().is_err());
        assert!("tpu".parse::<DevicePreference>().is_err());
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda { device_id: 3 }.to_string(), "cuda:3");
        assert!(Device::Cuda { device_id: 0 }.is_gpu());
    }
}
