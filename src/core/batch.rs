//! Batch planning over flat sample buffers.
//!
//! A caller hands over one flat `f32` buffer holding `n_samples` images laid
//! out back to back in `[channels, height, width]` order. [`BatchPlan`] checks
//! that the buffer splits evenly into batches and hands out borrowed
//! `[batch, channels, height, width]` views without copying.

use crate::core::errors::InferError;
use ndarray::ArrayView4;
use std::ops::Range;

/// A 4-dimensional borrowed tensor view over a caller's buffer.
pub type TensorView4<'a> = ArrayView4<'a, f32>;

/// Geometry of one sample image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDims {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Number of channels per pixel.
    pub channels: usize,
}

impl ImageDims {
    /// Creates new image dimensions.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Number of pixels per sample (`width * height`).
    ///
    /// Overflows for dimensions that [`BatchPlan`] would reject; use
    /// [`ImageDims::checked_sample_len`] on unvalidated input.
    pub fn pixels(&self) -> usize {
        self.width * self.height
    }

    /// Number of floats per sample (`width * height * channels`).
    pub fn sample_len(&self) -> usize {
        self.pixels() * self.channels
    }

    /// Number of floats per sample, or `None` if it does not fit in `usize`.
    pub fn checked_sample_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.channels)
    }

    /// Tensor shape for `batch` samples in NCHW order.
    pub fn nchw(&self, batch: usize) -> (usize, usize, usize, usize) {
        (batch, self.channels, self.height, self.width)
    }

    /// Checks the dimensions and returns the sample length.
    fn validate(&self) -> Result<usize, InferError> {
        if self.width == 0 || self.height == 0 || self.channels == 0 {
            return Err(InferError::invalid_input(format!(
                "image dimensions must be non-zero, got {}x{}x{}",
                self.width, self.height, self.channels
            )));
        }
        self.checked_sample_len().ok_or_else(|| {
            InferError::invalid_input(format!(
                "image dimensions {}x{}x{} would cause integer overflow",
                self.width, self.height, self.channels
            ))
        })
    }
}

/// A validated split of a sample buffer into equally sized batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    dims: ImageDims,
    n_samples: usize,
    batch_size: usize,
}

impl BatchPlan {
    /// Plans the batches for a buffer of `buffer_len` floats.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if `batch_size` or any dimension is zero.
    /// * `BufferSizeMismatch` if the buffer does not hold a whole number of samples.
    /// * `BatchSizeMismatch` if the sample count is not a multiple of `batch_size`.
    pub fn new(buffer_len: usize, dims: ImageDims, batch_size: usize) -> Result<Self, InferError> {
        Self::for_buffer("input", buffer_len, dims, batch_size)
    }

    /// Same as [`BatchPlan::new`], naming the buffer in size errors.
    pub fn for_buffer(
        buffer: &'static str,
        buffer_len: usize,
        dims: ImageDims,
        batch_size: usize,
    ) -> Result<Self, InferError> {
        let sample_len = dims.validate()?;
        if batch_size == 0 {
            return Err(InferError::invalid_input("batch size must be greater than 0"));
        }

        if buffer_len % sample_len != 0 {
            let expected = (buffer_len / sample_len) * sample_len;
            return Err(InferError::buffer_size_mismatch(buffer, expected, buffer_len));
        }

        let n_samples = buffer_len / sample_len;
        if n_samples % batch_size != 0 {
            return Err(InferError::BatchSizeMismatch {
                n_samples,
                batch_size,
            });
        }

        Ok(Self {
            dims,
            n_samples,
            batch_size,
        })
    }

    /// Per-sample geometry.
    pub fn dims(&self) -> ImageDims {
        self.dims
    }

    /// Total number of samples in the buffer.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of samples per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of forward passes needed.
    pub fn n_batches(&self) -> usize {
        self.n_samples / self.batch_size
    }

    /// Input element range covered by batch `index`.
    pub fn input_range(&self, index: usize) -> Range<usize> {
        self.output_range(index, self.dims.sample_len())
    }

    /// Output element range for batch `index` given `per_sample` result elements.
    pub fn output_range(&self, index: usize, per_sample: usize) -> Range<usize> {
        let len = self.batch_size * per_sample;
        let start = index * len;
        start..start + len
    }

    /// Borrows batch `index` of `buffer` as a `[batch, channels, height, width]` view.
    pub fn batch_view<'a>(
        &self,
        buffer: &'a [f32],
        index: usize,
    ) -> Result<TensorView4<'a>, InferError> {
        let range = self.input_range(index);
        let slice = buffer.get(range.clone()).ok_or_else(|| {
            InferError::invalid_input(format!(
                "batch {} range {:?} is outside a buffer of {} elements",
                index,
                range,
                buffer.len()
            ))
        })?;
        Ok(ArrayView4::from_shape(self.dims.nchw(self.batch_size), slice)?)
    }
}

/// Wraps a single-sample buffer as a `[1, channels, height, width]` view.
pub fn single_sample_view(buffer: &[f32], dims: ImageDims) -> Result<TensorView4<'_>, InferError> {
    let sample_len = dims.validate()?;
    if buffer.len() != sample_len {
        return Err(InferError::buffer_size_mismatch(
            "match",
            sample_len,
            buffer.len(),
        ));
    }
    Ok(ArrayView4::from_shape(dims.nchw(1), buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_counts() {
        let dims = ImageDims::new(4, 3, 2);
        let plan = BatchPlan::new(dims.sample_len() * 6, dims, 3).unwrap();
        assert_eq!(plan.n_samples(), 6);
        assert_eq!(plan.n_batches(), 2);
        assert_eq!(plan.input_range(1), 72..144);
        assert_eq!(plan.output_range(1, 2 * dims.pixels()), 72..144);
        assert_eq!(plan.output_range(1, 1), 3..6);
    }

    #[test]
    fn test_plan_rejects_uneven_batches() {
        let dims = ImageDims::new(2, 2, 1);
        let err = BatchPlan::new(dims.sample_len() * 5, dims, 2).unwrap_err();
        assert!(matches!(
            err,
            InferError::BatchSizeMismatch {
                n_samples: 5,
                batch_size: 2
            }
        ));
    }

    #[test]
    fn test_plan_rejects_partial_sample() {
        let dims = ImageDims::new(2, 2, 1);
        let err = BatchPlan::new(9, dims, 1).unwrap_err();
        assert!(matches!(
            err,
            InferError::BufferSizeMismatch {
                expected: 8,
                actual: 9,
                ..
            }
        ));
    }

    #[test]
    fn test_plan_rejects_zero_sizes() {
        let dims = ImageDims::new(2, 2, 1);
        assert!(matches!(
            BatchPlan::new(8, dims, 0),
            Err(InferError::InvalidInput { .. })
        ));
        assert!(matches!(
            BatchPlan::new(8, ImageDims::new(0, 2, 1), 1),
            Err(InferError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_plan_rejects_overflowing_dims() {
        let dims = ImageDims::new(usize::MAX / 2, 4, 1);
        assert_eq!(dims.checked_sample_len(), None);
        assert!(matches!(
            BatchPlan::new(0, dims, 1),
            Err(InferError::InvalidInput { .. })
        ));
        assert!(matches!(
            single_sample_view(&[], dims),
            Err(InferError::InvalidInput { .. })
        ));
        assert_eq!(ImageDims::new(4, 3, 2).checked_sample_len(), Some(24));
    }

    #[test]
    fn test_empty_buffer_has_no_batches() {
        let plan = BatchPlan::new(0, ImageDims::new(2, 2, 3), 4).unwrap();
        assert_eq!(plan.n_samples(), 0);
        assert_eq!(plan.n_batches(), 0);
    }

    #[test]
    fn test_batch_view_is_zero_copy() {
        let dims = ImageDims::new(2, 1, 1);
        let buffer: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let plan = BatchPlan::new(buffer.len(), dims, 2).unwrap();

        let view = plan.batch_view(&buffer, 1).unwrap();
        assert_eq!(view.shape(), &[2, 1, 1, 2]);
        assert_eq!(view[[0, 0, 0, 0]], 4.0);
        assert_eq!(view[[1, 0, 0, 1]], 7.0);
        assert_eq!(view.as_ptr(), buffer[4..].as_ptr());
    }

    #[test]
    fn test_single_sample_view() {
        let dims = ImageDims::new(2, 2, 1);
        let buffer = vec![1.0; 4];
        let view = single_sample_view(&buffer, dims).unwrap();
        assert_eq!(view.shape(), &[1, 1, 2, 2]);
        assert!(matches!(
            single_sample_view(&buffer[..3], dims),
            Err(InferError::BufferSizeMismatch { buffer: "match", .. })
        ));
    }
}
