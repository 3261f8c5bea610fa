//! Differentiable crop.
//!
//! # Autograd Pattern
//!
//! Follows the closure style used across the crate:
//! 1. **Forward Pass** crops `x` and returns the window.
//! 2. **Backward Pass** is a closure capturing only the offsets and the
//!    shape of `x`; given `dL/d(out)` it returns `dL/d(x)`, which is zero
//!    outside the window.
//!
//! The closure implements `Fn`, so it may be called once per incoming gradient.

use crate::crop::{crop_grad_tensor, crop_tensor};
use crate::error::{CropError, Result};
use crate::tensors::{Element, Tensor};

/// Crops `x` to `shape` starting at `offsets`.
///
/// # Returns
/// - `out`: the cropped window.
/// - `back`: closure mapping `dL/d(out)` to `dL/d(x)`.
///
/// # Errors
/// The forward pass fails as [`crop_tensor`]. The closure returns
/// [`CropError::OutputShape`] when the gradient is not shaped like `out`.
///
/// # Example
/// ```rust
/// use briny_crop::tensor;
///
/// let x = tensor!([[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
/// let (out, back) = briny_crop::backprop::crop(&x, &[0, 1], &[2, 2])?;
/// assert_eq!(out.data, vec![2.0, 3.0, 5.0, 6.0]);
///
/// let d_x = back(&tensor!([[1.0f32, 1.0], [1.0, 1.0]]))?;
/// assert_eq!(d_x.data, vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
/// # Ok::<(), briny_crop::error::CropError>(())
/// ```
pub fn crop<T: Element>(
    x: &Tensor<T>,
    offsets: &[i64],
    shape: &[usize],
) -> Result<(Tensor<T>, impl Fn(&Tensor<T>) -> Result<Tensor<T>> + use<T>)> {
    let out = crop_tensor(x, offsets, shape)?;

    let offsets = offsets.to_vec();
    let x_shape = x.shape.clone();
    let out_shape = out.shape.clone();
    let back = move |d_out: &Tensor<T>| {
        if d_out.shape != out_shape {
            return Err(CropError::OutputShape {
                expected: out_shape.clone(),
                got: d_out.shape.clone(),
            });
        }
        crop_grad_tensor(d_out, &offsets, &x_shape)
    };

    Ok((out, back))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{set_backend, Backend};

    #[test]
    fn backward_is_zero_outside_window() {
        set_backend(Backend::Cpu);
        let x = Tensor::new(vec![3, 3], (0..9).map(|v| v as f64).collect());
        let (out, back) = crop(&x, &[1, 0], &[2, 1]).unwrap();
        assert_eq!(out.data, vec![3.0, 6.0]);

        let d_x = back(&Tensor::new(vec![2, 1], vec![0.5, -2.0])).unwrap();
        assert_eq!(d_x.shape, vec![3, 3]);
        assert_eq!(
            d_x.data,
            vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.0, -2.0, 0.0, 0.0]
        );
    }

    #[test]
    fn closure_can_be_reused() {
        set_backend(Backend::Cpu);
        let x = Tensor::new(vec![4], vec![1.0f32, 2.0, 3.0, 4.0]);
        let (_, back) = crop(&x, &[2], &[2]).unwrap();
        let first = back(&Tensor::new(vec![2], vec![1.0, 1.0])).unwrap();
        let second = back(&Tensor::new(vec![2], vec![3.0, 4.0])).unwrap();
        assert_eq!(first.data, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(second.data, vec![0.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn backward_rejects_misshapen_gradient() {
        let x = Tensor::new(vec![4], vec![1.0f32, 2.0, 3.0, 4.0]);
        let (_, back) = crop(&x, &[1], &[2]).unwrap();
        let err = back(&Tensor::new(vec![3], vec![0.0; 3])).unwrap_err();
        assert_eq!(
            err,
            CropError::OutputShape {
                expected: vec![2],
                got: vec![3]
            }
        );
    }

    #[test]
    fn forward_errors_propagate() {
        let x = Tensor::new(vec![4], vec![1.0f32, 2.0, 3.0, 4.0]);
        let err = crop(&x, &[3], &[2]).err();
        assert_eq!(
            err,
            Some(CropError::OutOfRange {
                axis: 0,
                offset: 3,
                extent: 2,
                dim: 4
            })
        );
    }
}
