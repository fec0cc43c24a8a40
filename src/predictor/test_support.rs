//! Deterministic model stubs for predictor tests.

use crate::core::device::Device;
use crate::core::errors::InferError;
use crate::core::inference::{TensorInput, TensorOutput};
use crate::core::traits::ModelService;
use std::sync::Mutex;

type ForwardFn =
    dyn Fn(usize, &[TensorInput<'_>]) -> Result<Vec<TensorOutput>, InferError> + Send + Sync;

/// A copy of one input tensor seen by the stub.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedInput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
    pub ptr: usize,
}

/// Model service driven by a closure receiving the call index and inputs.
pub struct StubModel {
    forward: Box<ForwardFn>,
    calls: Mutex<Vec<Vec<RecordedInput>>>,
}

impl std::fmt::Debug for StubModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubModel")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl StubModel {
    pub fn new<F>(forward: F) -> Self
    where
        F: Fn(usize, &[TensorInput<'_>]) -> Result<Vec<TensorOutput>, InferError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            forward: Box::new(forward),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn recorded(&self) -> Vec<Vec<RecordedInput>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModelService for StubModel {
    fn forward(&self, inputs: &[TensorInput<'_>]) -> Result<Vec<TensorOutput>, InferError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(
                inputs
                    .iter()
                    .map(|input| RecordedInput {
                        shape: input.shape().to_vec(),
                        data: input.as_slice().unwrap().to_vec(),
                        ptr: input.view().as_ptr() as usize,
                    })
                    .collect(),
            );
            calls.len() - 1
        };
        (self.forward)(call_index, inputs)
    }

    fn device(&self) -> Device {
        Device::Cpu
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

