//! CUDA placeholder backend.
//!
//! Selecting [`Backend::Cuda`](crate::backend::Backend::Cuda) currently runs
//! the WGSL kernel, which on NVIDIA hardware goes through Vulkan.

use crate::paddings::Paddings;
use crate::tensors::{Element, Tensor};

/// Pads `input` into `out` on an NVIDIA device.
///
/// Returns `false` when the request cannot be served on the GPU.
pub fn cuda_pad<T: Element, const D: usize>(
    input: &Tensor<T>,
    paddings: &Paddings<D>,
    value: T,
    out: &mut Tensor<T>,
) -> bool {
    // TODO: implement using `cust` crate
    super::wgpu::wgpu_pad(input, paddings, value, out) // wgpu fallback
}
