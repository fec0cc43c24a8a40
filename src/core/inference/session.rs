//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::errors::InferError;
use ort::session::{Session, builder::SessionBuilder};
use std::path::Path;

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

/// Builds a session using a caller-provided builder configuration.
///
/// A missing file is reported before ONNX Runtime is initialized, so the
/// error does not depend on the runtime being available.
pub(crate) fn load_session_with<F>(
    model_path: impl AsRef<Path>,
    configure_builder: F,
    suggestion: Option<&str>,
) -> Result<Session, InferError>
where
    F: FnOnce(SessionBuilder) -> Result<SessionBuilder, ort::Error>,
{
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(InferError::model_load_error(
            path,
            "model file not found",
            Some("verify the model path"),
            None::<std::io::Error>,
        ));
    }

    let builder = Session::builder().map_err(|e| {
        InferError::model_load_error(path, SESSION_CREATION_FAILURE, suggestion, Some(e))
    })?;
    let builder = configure_builder(builder).map_err(|e| {
        InferError::model_load_error(path, "invalid session configuration", suggestion, Some(e))
    })?;
    let session = builder.commit_from_file(path).map_err(|e| {
        InferError::model_load_error(path, SESSION_CREATION_FAILURE, suggestion, Some(e))
    })?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_session_missing_file() {
        let err = load_session_with("does/not/exist.onnx", Ok, None).unwrap_err();
        match err {
            InferError::ModelLoad {
                model_path, reason, ..
            } => {
                assert!(model_path.contains("exist.onnx"));
                assert_eq!(reason, "model file not found");
            }
            other => panic!("expected ModelLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_load_session_corrupt_file() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"not an onnx graph \x00\x01\x02").unwrap();

        let err = load_session_with(file.path(), Ok, Some("re-export the model")).unwrap_err();
        match err {
            InferError::ModelLoad {
                reason,
                suggestion,
                source,
                ..
            } => {
                assert_ne!(reason, "model file not found");
                assert!(suggestion.contains("re-export the model"));
                assert!(source.is_some());
            }
            other => panic!("expected ModelLoad, got {other:?}"),
        }
    }
}
