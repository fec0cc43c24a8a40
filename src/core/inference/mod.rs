//! ONNX Runtime integration.
//!
//! This module holds the runtime-facing half of the crate: session loading,
//! the [`OrtModel`] service and the tensor types exchanged with it.

pub mod ort_model;
pub(crate) mod session;
pub mod tensor;

pub use ort_model::OrtModel;
pub use tensor::{TensorInput, TensorOutput};
