//! Crop and crop-gradient kernels.
//!
//! # Crop
//!
//! A crop copies the window `[offsets, offsets + out.shape)` of `x` into the
//! pre-allocated `out`. Its gradient is the adjoint: the incoming `d_out` is
//! written back into `d_x` at the same offsets, with zeros everywhere else.
//!
//! Both directions build a [`Paddings`] descriptor (negative amounts for the
//! crop, non-negative for the gradient) and hand it to the backend-dispatched
//! pad primitive in [`ops::dispatch`](crate::ops::dispatch).
//!
//! The `*_into` functions take a runtime rank and route through
//! [`dispatch_rank`]; [`crop`] and [`crop_grad`] are the rank-`D`
//! specializations they land on.
//!
//! # Example
//!
//! ```rust
//! use briny_crop::crop::{crop_grad_tensor, crop_tensor};
//! use briny_crop::tensors::Tensor;
//!
//! let x = Tensor::new(vec![4, 4], (0..16).map(|v| v as f32).collect());
//! let out = crop_tensor(&x, &[1, 1], &[2, 2])?;
//! assert_eq!(out.data, vec![5.0, 6.0, 9.0, 10.0]);
//!
//! let d_x = crop_grad_tensor(&Tensor::new(vec![2, 2], vec![1.0; 4]), &[1, 1], &[4, 4])?;
//! assert_eq!(d_x.data.iter().sum::<f32>(), 4.0);
//! # Ok::<(), briny_crop::error::CropError>(())
//! ```

use crate::backend::{get_backend, Backend};
use crate::error::Result;
use crate::ops::dispatch;
use crate::paddings::Paddings;
use crate::rank::{dispatch_rank, RankKernel};
use crate::tensors::{Element, Tensor};

/// Crops `x` into `out`, starting at `offsets`, for a rank known at compile time.
///
/// # Errors
///
/// - [`CropError::UnsupportedRank`](crate::error::CropError::UnsupportedRank) if `D` is outside `1..=6`
/// - [`CropError::OffsetsLength`](crate::error::CropError::OffsetsLength) if there is not one offset per axis of `x`
/// - [`CropError::RankMismatch`](crate::error::CropError::RankMismatch) if `x`, `out` and `D` disagree on rank
/// - [`CropError::OutOfRange`](crate::error::CropError::OutOfRange) if the window does not fit inside `x`
pub fn crop<T: Element, const D: usize>(
    backend: Backend,
    x: &Tensor<T>,
    offsets: &[i64],
    out: &mut Tensor<T>,
) -> Result<()> {
    let paddings = Paddings::<D>::for_crop(&x.shape, &out.shape, offsets)?;
    dispatch::pad(backend, x, &paddings, T::zero(), out)
}

/// Scatters `d_out` into `d_x` at `offsets` and zero-fills the rest of `d_x`.
///
/// # Errors
///
/// Same conditions as [`crop`], with `d_x` as the larger tensor.
pub fn crop_grad<T: Element, const D: usize>(
    backend: Backend,
    d_out: &Tensor<T>,
    offsets: &[i64],
    d_x: &mut Tensor<T>,
) -> Result<()> {
    let paddings = Paddings::<D>::for_crop_grad(&d_x.shape, &d_out.shape, offsets)?;
    dispatch::pad(backend, d_out, &paddings, T::zero(), d_x)
}

struct CropKernel<'a, T> {
    backend: Backend,
    x: &'a Tensor<T>,
    offsets: &'a [i64],
    out: &'a mut Tensor<T>,
}

impl<T: Element> RankKernel for CropKernel<'_, T> {
    type Output = Result<()>;

    fn run<const D: usize>(self) -> Result<()> {
        crop::<T, D>(self.backend, self.x, self.offsets, self.out)
    }
}

struct CropGradKernel<'a, T> {
    backend: Backend,
    d_out: &'a Tensor<T>,
    offsets: &'a [i64],
    d_x: &'a mut Tensor<T>,
}

impl<T: Element> RankKernel for CropGradKernel<'_, T> {
    type Output = Result<()>;

    fn run<const D: usize>(self) -> Result<()> {
        crop_grad::<T, D>(self.backend, self.d_out, self.offsets, self.d_x)
    }
}

/// Crops `x` into the pre-allocated `out`, dispatching on the rank of `x`.
///
/// # Errors
///
/// [`CropError::UnsupportedRank`](crate::error::CropError::UnsupportedRank)
/// for ranks outside `1..=6`, otherwise as [`crop`].
pub fn crop_into<T: Element>(
    backend: Backend,
    x: &Tensor<T>,
    offsets: &[i64],
    out: &mut Tensor<T>,
) -> Result<()> {
    let kernel = CropKernel {
        backend,
        x,
        offsets,
        out,
    };
    dispatch_rank(x.rank(), kernel)?
}

/// Scatters `d_out` into the pre-allocated `d_x`, dispatching on the rank of `d_out`.
///
/// # Errors
///
/// [`CropError::UnsupportedRank`](crate::error::CropError::UnsupportedRank)
/// for ranks outside `1..=6`, otherwise as [`crop_grad`].
pub fn crop_grad_into<T: Element>(
    backend: Backend,
    d_out: &Tensor<T>,
    offsets: &[i64],
    d_x: &mut Tensor<T>,
) -> Result<()> {
    let kernel = CropGradKernel {
        backend,
        d_out,
        offsets,
        d_x,
    };
    dispatch_rank(d_out.rank(), kernel)?
}

/// Allocates a `shape` tensor and crops `x` into it on the default backend.
///
/// # Errors
///
/// As [`crop_into`].
pub fn crop_tensor<T: Element>(x: &Tensor<T>, offsets: &[i64], shape: &[usize]) -> Result<Tensor<T>> {
    let mut out = Tensor::zeros(shape);
    crop_into(get_backend(), x, offsets, &mut out)?;
    Ok(out)
}

/// Allocates an `x_shape` gradient and scatters `d_out` into it on the default backend.
///
/// # Errors
///
/// As [`crop_grad_into`].
pub fn crop_grad_tensor<T: Element>(
    d_out: &Tensor<T>,
    offsets: &[i64],
    x_shape: &[usize],
) -> Result<Tensor<T>> {
    let mut d_x = Tensor::zeros(x_shape);
    crop_grad_into(get_backend(), d_out, offsets, &mut d_x)?;
    Ok(d_x)
}
