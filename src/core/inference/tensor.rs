//! Tensors passed to and returned from a model service.

use crate::core::batch::TensorView4;
use crate::core::errors::InferError;

/// A borrowed 4D f32 input tensor.
///
/// Wraps a view over the caller's buffer; the runtime reads it in place.
#[derive(Debug, Clone, Copy)]
pub struct TensorInput<'a> {
    view: TensorView4<'a>,
}

impl<'a> TensorInput<'a> {
    /// Wraps a 4D view.
    pub fn new(view: TensorView4<'a>) -> Self {
        Self { view }
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        self.view.shape()
    }

    /// Returns the underlying view.
    pub fn view(&self) -> TensorView4<'a> {
        self.view
    }

    /// Returns the contiguous data backing the tensor.
    pub fn as_slice(&self) -> Result<&'a [f32], InferError> {
        self.view
            .to_slice()
            .ok_or_else(|| InferError::invalid_input("input tensor is not contiguous in memory"))
    }
}

impl<'a> From<TensorView4<'a>> for TensorInput<'a> {
    fn from(view: TensorView4<'a>) -> Self {
        Self::new(view)
    }
}

/// An owned f32 output tensor.
///
/// The predictors only care about element counts and order, so no
/// dimensional typing is imposed here.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorOutput {
    /// Tensor shape as reported by the runtime.
    pub shape: Vec<i64>,
    /// Row-major tensor data.
    pub data: Vec<f32>,
}

impl TensorOutput {
    /// Creates a tensor output, checking that `data` matches `shape`.
    pub fn new(shape: Vec<i64>, data: Vec<f32>) -> Result<Self, InferError> {
        let expected = shape
            .iter()
            .map(|&d| usize::try_from(d).unwrap_or(0))
            .product::<usize>();
        if expected != data.len() {
            return Err(InferError::invalid_input(format!(
                "Data length mismatch: shape {:?} implies {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Creates a tensor output of `shape` with every element set to `value`.
    #[cfg(test)]
    pub(crate) fn filled(shape: &[usize], value: f32) -> Self {
        let len = shape.iter().product();
        Self {
            shape: shape.iter().map(|&d| d as i64).collect(),
            data: vec![value; len],
        }
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Returns the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayView4;

    #[test]
    fn test_tensor_output_new_checks_length() {
        let t = TensorOutput::new(vec![2, 3], vec![0.0; 6]).unwrap();
        assert_eq!(t.len(), 6);
        assert_eq!(t.shape(), &[2, 3]);

        let err = TensorOutput::new(vec![2, 3], vec![0.0; 7]).unwrap_err();
        assert!(err.to_string().contains("Data length mismatch"));
    }

    #[test]
    fn test_tensor_output_filled() {
        let t = TensorOutput::filled(&[2, 1, 3], 1.5);
        assert_eq!(t.shape(), &[2, 1, 3]);
        assert!(t.data.iter().all(|&v| v == 1.5));

        let empty = TensorOutput::filled(&[0, 5], 0.0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_tensor_input_exposes_contiguous_slice() {
        let data = vec![0.0f32, 1.0, 2.0, 3.0];
        let view = ArrayView4::from_shape((1, 1, 2, 2), &data[..]).unwrap();
        let input = TensorInput::from(view);
        assert_eq!(input.shape(), &[1, 1, 2, 2]);
        assert_eq!(input.as_slice().unwrap(), &data[..]);
    }
}
