//! Operation Dispatch Layer
//!
//! This module selects the backend (CPU, WGPU, CUDA) that runs the pad
//! primitive for a given invocation, after checking shapes once in a
//! backend-agnostic place.
//!
//! Each call attempts backend-specific implementations in priority order:
//! 1. `Cuda` (if enabled)
//! 2. `Wgpu` (if enabled)
//! 3. Falls back to `Cpu`
//!
//! # Design Highlights
//! - **Pluggable**: Backends are optional and modular
//! - **Minimal overhead**: Function returns immediately upon match
//! - **Fallback logic**: Safe and deterministic fallback to CPU

use crate::backend::Backend;
use crate::error::{CropError, Result};
use crate::paddings::Paddings;
use crate::rank::MAX_RANK;
use crate::tensors::{Element, Tensor};

/// Pads `input` by `paddings` into the pre-allocated `out` on `backend`.
///
/// # Errors
///
/// - [`CropError::UnsupportedRank`] if `D` is 0 or above [`MAX_RANK`]
/// - [`CropError::DataLength`] if either tensor's data does not fill its shape
/// - [`CropError::RankMismatch`] if either tensor does not have `D` axes
/// - [`CropError::OutputShape`] if `out` does not have the padded shape
pub fn pad<T: Element, const D: usize>(
    backend: Backend,
    input: &Tensor<T>,
    paddings: &Paddings<D>,
    value: T,
    out: &mut Tensor<T>,
) -> Result<()> {
    if D == 0 || D > MAX_RANK {
        log::error!("only ranks up to {MAX_RANK} supported, got {D}");
        return Err(CropError::UnsupportedRank { rank: D });
    }
    for t in [&*input, &*out] {
        let expected = t.shape.iter().product::<usize>();
        if expected != t.data.len() {
            return Err(CropError::DataLength {
                expected,
                got: t.data.len(),
            });
        }
    }
    if input.rank() != D || out.rank() != D {
        return Err(CropError::RankMismatch {
            input: input.rank(),
            output: out.rank(),
        });
    }
    let expected = paddings.apply(&input.shape);
    if expected.as_deref() != Some(out.shape.as_slice()) {
        return Err(CropError::OutputShape {
            expected: expected.unwrap_or_default(),
            got: out.shape.clone(),
        });
    }

    log::debug!(
        "pad {:?} -> {:?} on {backend:?} with {:?}",
        input.shape,
        out.shape,
        paddings.0
    );

    match backend {
        Backend::Cuda => {
            #[cfg(feature = "cuda")]
            {
                if super::cuda::cuda_pad(input, paddings, value, out) {
                    return Ok(());
                }
            }
        }
        Backend::Wgpu => {
            #[cfg(any(feature = "wgpu", feature = "cuda"))]
            {
                if super::wgpu::wgpu_pad(input, paddings, value, out) {
                    return Ok(());
                }
            }
        }
        Backend::Cpu => {}
    }

    super::cpu::pad(input, paddings, value, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paddings::Padding;

    #[test]
    fn rejects_output_with_wrong_shape() {
        let input = Tensor::new(vec![4], vec![1, 2, 3, 4]);
        let mut out = Tensor::zeros(vec![3]);
        let pads = Paddings([Padding::new(-1, -1)]);
        let err = pad(Backend::Cpu, &input, &pads, 0, &mut out).unwrap_err();
        assert_eq!(
            err,
            CropError::OutputShape {
                expected: vec![2],
                got: vec![3]
            }
        );
        assert_eq!(out.data, vec![0, 0, 0]);
    }

    #[test]
    fn rejects_wrong_rank_for_specialization() {
        let input = Tensor::new(vec![2, 2], vec![1, 2, 3, 4]);
        let mut out = Tensor::zeros(vec![2, 2]);
        let err = pad(Backend::Cpu, &input, &Paddings::<3>::default(), 0, &mut out).unwrap_err();
        assert_eq!(err, CropError::RankMismatch { input: 2, output: 2 });
    }

    #[test]
    fn rejects_ranks_without_a_kernel() {
        let scalar = Tensor::new(Vec::<usize>::new(), vec![1.0f32]);
        let mut out = Tensor::new(Vec::<usize>::new(), vec![5.0]);
        let err = pad(Backend::Cpu, &scalar, &Paddings::<0>::default(), 0.0, &mut out).unwrap_err();
        assert_eq!(err, CropError::UnsupportedRank { rank: 0 });
        assert_eq!(out.data, vec![5.0]);
    }

    #[test]
    fn rejects_inconsistent_tensor() {
        let input = Tensor {
            shape: vec![3],
            data: vec![1, 2],
        };
        let mut out = Tensor::zeros(vec![3]);
        let err = pad(Backend::Cpu, &input, &Paddings::<1>::default(), 0, &mut out).unwrap_err();
        assert_eq!(err, CropError::DataLength { expected: 3, got: 2 });
    }

    #[test]
    fn gpu_request_falls_back_for_integers() {
        let input = Tensor::new(vec![2], vec![1i64, 2]);
        let mut out = Tensor::zeros(vec![4]);
        let pads = Paddings([Padding::new(1, 1)]);
        pad(Backend::Wgpu, &input, &pads, 0, &mut out).unwrap();
        assert_eq!(out.data, vec![0, 1, 2, 0]);
    }
}
