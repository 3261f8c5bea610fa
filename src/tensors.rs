//! Core tensor data structures.
//!
//! # Dense Tensors
//!
//! A [`Tensor`] is a shape plus a flat, contiguous, row-major buffer. The crop
//! kernels never allocate or free tensors themselves; they read from one
//! tensor and write into another that the caller (usually an
//! [`ExecutionContext`](crate::context::ExecutionContext)) already owns.
//!
//! ## Design Highlights
//! - Tensors are strongly typed: `Tensor<T>` for any [`Element`]
//! - Shape is stored as a `Vec<usize>` and enforced at construction
//! - The `tensor!` macro supports ergonomic tensor creation from nested arrays
//!
//! ## Limitations
//! - Row-major only
//! - No strided views; every tensor owns its contiguous storage
//!
//! ## Example
//!
//! ```rust
//! use briny_crop::tensors::Tensor;
//! let t = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! assert_eq!(t.shape, vec![2, 3]);
//! assert_eq!(t.rank(), 2);
//! ```

use crate::error::{CropError, Result};

/// Numeric element types that can be cropped and padded.
///
/// `zero()` is the value written into inserted (padded) positions.
pub trait Element: Copy + PartialEq + Send + Sync + core::fmt::Debug + 'static {
    /// The additive identity.
    fn zero() -> Self;

    /// Views the buffer as `f32`s when the element type is `f32`.
    ///
    /// GPU kernels only operate on single precision; other types stay on the CPU.
    fn as_f32(_data: &[Self]) -> Option<&[f32]> {
        None
    }

    /// Mutable counterpart of [`Element::as_f32`].
    fn as_f32_mut(_data: &mut [Self]) -> Option<&mut [f32]> {
        None
    }
}

impl Element for f32 {
    fn zero() -> Self {
        0.0
    }

    fn as_f32(data: &[Self]) -> Option<&[f32]> {
        Some(data)
    }

    fn as_f32_mut(data: &mut [Self]) -> Option<&mut [f32]> {
        Some(data)
    }
}

impl Element for f64 {
    fn zero() -> Self {
        0.0
    }
}

macro_rules! int_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                fn zero() -> Self {
                    0
                }
            }
        )*
    };
}

int_element!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Represents an N-dimensional tensor with a shape and flat row-major data.
///
/// - All elements must be the same type (`T`).
/// - `shape` defines the structure, e.g., `[2, 3]` for a 2×3 matrix.
/// - `data` holds the flattened content in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

impl<T> Tensor<T> {
    /// Creates a new tensor with the given shape and flat data.
    ///
    /// # Panics
    /// Panics if the number of elements in `data` does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }

    /// Fallible version of [`Tensor::new`].
    ///
    /// # Errors
    /// Returns [`CropError::DataLength`] if `data` does not fill `shape` exactly.
    pub fn try_new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(CropError::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Number of axes.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements (some axis has extent 0).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major strides, in elements.
    #[must_use]
    pub fn strides(&self) -> Vec<usize> {
        strides_of(&self.shape)
    }

    /// Returns the element at a multi-dimensional index, if in bounds.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.rank() || index.iter().zip(&self.shape).any(|(&i, &d)| i >= d) {
            return None;
        }
        let flat = index
            .iter()
            .zip(self.strides())
            .map(|(&i, s)| i * s)
            .sum::<usize>();
        self.data.get(flat)
    }
}

impl<T: Element> Tensor<T> {
    /// Creates a tensor of the given shape filled with [`Element::zero`].
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![T::zero(); len],
        }
    }
}

/// Computes row-major strides for `shape`.
pub(crate) fn strides_of(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary dimensionality as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use briny_crop::tensor;
/// let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape, vec![2, 2]);
/// ```
#[macro_export]
macro_rules! tensor {
    ($lit:literal) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$lit])
    };

    ([ $( $inner:tt ),+ $(,)? ]) => {{
        let children = vec![ $( $crate::tensor!($inner) ),+ ];
        let first_shape = &children[0].shape;
        assert!(children.iter().all(|c| c.shape == *first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_builds_row_major_data() {
        let t = tensor!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(t.shape, vec![2, 3]);
        assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "incompatible")]
    fn new_panics_on_shape_mismatch() {
        let _ = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn only_f32_exposes_an_f32_view() {
        assert_eq!(f32::as_f32(&[1.5]), Some(&[1.5f32][..]));
        assert!(f64::as_f32(&[1.5]).is_none());
        assert!(i32::as_f32_mut(&mut [1, 2]).is_none());
    }

    #[test]
    fn try_new_reports_data_length() {
        let err = Tensor::try_new(vec![2, 3], vec![0i32; 5]).unwrap_err();
        assert_eq!(err, CropError::DataLength { expected: 6, got: 5 });
    }

    #[test]
    fn strides_and_indexing() {
        let t = Tensor::new(vec![2, 3, 4], (0..24).collect::<Vec<i64>>());
        assert_eq!(t.strides(), vec![12, 4, 1]);
        assert_eq!(t.get(&[1, 2, 3]), Some(&23));
        assert_eq!(t.get(&[0, 1, 0]), Some(&4));
        assert_eq!(t.get(&[2, 0, 0]), None);
        assert_eq!(t.get(&[0, 0]), None);
    }

    #[test]
    fn zeros_with_empty_axis() {
        let t = Tensor::<f32>::zeros(vec![3, 0, 2]);
        assert!(t.is_empty());
        assert_eq!(t.rank(), 3);
    }
}
