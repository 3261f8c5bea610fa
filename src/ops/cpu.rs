//! Parallel CPU pad kernel
//!
//! # CPU Backend
//!
//! The default backend, and the fallback whenever a GPU path declines a
//! request. Output rows along the innermost axis are independent, so they
//! are filled in parallel with [`rayon`](https://docs.rs/rayon): each row is
//! either entirely padding, or a fill prefix, one contiguous copy from the
//! input, and a fill suffix.
//!
//! ## Safety
//!
//! - Shapes are validated by [`dispatch`](super::dispatch) before this runs
//! - No `unsafe`; all copies go through bounds-checked slices

use crate::paddings::Paddings;
use crate::tensors::{Element, Tensor};
use rayon::prelude::*;

/// Writes `input` padded by `paddings` into `out`, using `value` for every
/// inserted position.
///
/// Negative amounts drop leading/trailing data along an axis, positive
/// amounts insert `value`. `out` must already have the padded shape.
///
/// # Example
/// ```rust
/// use briny_crop::ops::cpu::pad;
/// use briny_crop::paddings::{Padding, Paddings};
/// use briny_crop::tensors::Tensor;
///
/// let input = Tensor::new(vec![3], vec![1, 2, 3]);
/// let mut out = Tensor::zeros(vec![4]);
/// pad(&input, &Paddings([Padding::new(-1, 2)]), 0, &mut out);
/// assert_eq!(out.data, vec![2, 3, 0, 0]);
/// ```
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn pad<T: Element, const D: usize>(
    input: &Tensor<T>,
    paddings: &Paddings<D>,
    value: T,
    out: &mut Tensor<T>,
) {
    if D == 0 || out.data.is_empty() {
        return;
    }

    let Tensor { shape, data: out_data } = out;
    let out_shape: &[usize] = shape;
    let in_shape = &input.shape;
    let in_strides = input.strides();
    let src = &input.data;

    let row_len = out_shape[D - 1];
    let last = paddings.0[D - 1];

    // columns of every output row that are backed by input data
    let col_start = last.low.clamp(0, row_len as isize) as usize;
    let col_end = (last.low + in_shape[D - 1] as isize).clamp(0, row_len as isize) as usize;

    out_data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, chunk)| {
            let base = source_row(row, out_shape, in_shape, &in_strides, paddings);
            match base {
                Some(base) if col_start < col_end => {
                    let from = base + (col_start as isize - last.low) as usize;
                    let len = col_end - col_start;
                    chunk[..col_start].fill(value);
                    chunk[col_start..col_end].copy_from_slice(&src[from..from + len]);
                    chunk[col_end..].fill(value);
                }
                _ => chunk.fill(value),
            }
        });
}

/// Flat input offset of the row feeding output row `row`, or `None` when the
/// row lies entirely in padding on some outer axis.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn source_row<const D: usize>(
    row: usize,
    out_shape: &[usize],
    in_shape: &[usize],
    in_strides: &[usize],
    paddings: &Paddings<D>,
) -> Option<usize> {
    let mut rem = row;
    let mut base = 0usize;
    for axis in (0..D - 1).rev() {
        let coord = (rem % out_shape[axis]) as isize - paddings.0[axis].low;
        rem /= out_shape[axis];
        if coord < 0 || coord >= in_shape[axis] as isize {
            return None;
        }
        base += coord as usize * in_strides[axis];
    }
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paddings::Padding;

    #[test]
    fn crops_matrix_interior() {
        let input = Tensor::new(vec![4, 4], (0..16).collect::<Vec<i32>>());
        let mut out = Tensor::zeros(vec![2, 2]);
        let pads = Paddings([Padding::new(-1, -1), Padding::new(-1, -1)]);
        pad(&input, &pads, 0, &mut out);
        assert_eq!(out.data, vec![5, 6, 9, 10]);
    }

    #[test]
    fn inserts_fill_on_every_side() {
        let input = Tensor::new(vec![1, 2], vec![7.0, 8.0]);
        let mut out = Tensor::new(vec![3, 4], vec![f64::NAN; 12]);
        let pads = Paddings([Padding::new(1, 1), Padding::new(1, 1)]);
        pad(&input, &pads, -1.0, &mut out);
        assert_eq!(
            out.data,
            vec![
                -1.0, -1.0, -1.0, -1.0, //
                -1.0, 7.0, 8.0, -1.0, //
                -1.0, -1.0, -1.0, -1.0,
            ]
        );
    }

    #[test]
    fn mixed_signs_crop_one_axis_and_pad_another() {
        let input = Tensor::new(vec![3, 2], vec![1, 2, 3, 4, 5, 6]);
        let mut out = Tensor::zeros(vec![1, 4]);
        let pads = Paddings([Padding::new(-2, 0), Padding::new(2, 0)]);
        pad(&input, &pads, 9, &mut out);
        assert_eq!(out.data, vec![9, 9, 5, 6]);
    }

    #[test]
    fn rank_one_identity() {
        let input = Tensor::new(vec![5], vec![1u8, 2, 3, 4, 5]);
        let mut out = Tensor::zeros(vec![5]);
        pad(&input, &Paddings::<1>::default(), 0, &mut out);
        assert_eq!(out, input);
    }

    #[test]
    fn empty_input_yields_all_fill() {
        let input = Tensor::<f32>::zeros(vec![0, 3]);
        let mut out = Tensor::zeros(vec![2, 3]);
        let pads = Paddings([Padding::new(1, 1), Padding::new(0, 0)]);
        pad(&input, &pads, 4.0, &mut out);
        assert!(out.data.iter().all(|&v| v == 4.0));
    }

    #[test]
    fn empty_output_is_a_no_op() {
        let input = Tensor::new(vec![2, 2], vec![1, 2, 3, 4]);
        let mut out = Tensor::zeros(vec![0, 2]);
        let pads = Paddings([Padding::new(-1, -1), Padding::new(0, 0)]);
        pad(&input, &pads, 0, &mut out);
        assert!(out.is_empty());
    }
}
