//! Configuration error types and validation traits.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a model path does not exist.
    #[error("model path does not exist: {path}")]
    ModelPathNotFound { path: std::path::PathBuf },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates that a model file exists on disk.
    fn validate_model_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ModelPathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::InvalidConfig {
                message: format!("model path is not a file: {}", path.display()),
            });
        }
        Ok(())
    }

    /// Validates an optional thread count (must be non-zero when set).
    fn validate_thread_count(&self, name: &str, threads: Option<usize>) -> Result<(), ConfigError> {
        match threads {
            Some(0) => Err(ConfigError::InvalidConfig {
                message: format!("{name} must be greater than 0"),
            }),
            _ => Ok(()),
        }
    }
}
