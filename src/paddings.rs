//! Signed per-axis pad descriptors.
//!
//! Cropping and its gradient are the same primitive seen from opposite
//! sides: a crop pads with negative amounts (dropping data), the gradient
//! pads with non-negative amounts (inserting zeros). [`Paddings`] carries one
//! signed `(low, high)` pair per axis, sized at compile time by the rank.

use crate::error::{CropError, Result};

/// Amount to add before (`low`) and after (`high`) the data along one axis.
///
/// Negative values remove that many elements instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    /// Elements added before the data (removed when negative).
    pub low: isize,
    /// Elements added after the data (removed when negative).
    pub high: isize,
}

impl Padding {
    /// Creates a new pair.
    #[must_use]
    pub const fn new(low: isize, high: isize) -> Self {
        Self { low, high }
    }

    /// Extent of an axis of length `dim` after padding, or `None` if it
    /// would be negative.
    #[must_use]
    pub fn apply(&self, dim: usize) -> Option<usize> {
        let dim = isize::try_from(dim).ok()?;
        usize::try_from(dim + self.low + self.high).ok()
    }
}

/// A full descriptor for a rank-`D` tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paddings<const D: usize>(pub [Padding; D]);

impl<const D: usize> Default for Paddings<D> {
    fn default() -> Self {
        Self([Padding::default(); D])
    }
}

impl<const D: usize> Paddings<D> {
    /// Shape produced by padding a tensor of shape `input`.
    ///
    /// Returns `None` if `input` does not have `D` axes or any axis would
    /// end up with a negative extent.
    #[must_use]
    pub fn apply(&self, input: &[usize]) -> Option<Vec<usize>> {
        if input.len() != D {
            return None;
        }
        input
            .iter()
            .zip(&self.0)
            .map(|(&dim, pad)| pad.apply(dim))
            .collect()
    }

    /// Whether every pair is `(0, 0)`.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|p| p.low == 0 && p.high == 0)
    }

    /// Builds the descriptor that crops `x_dims` down to `out_dims`,
    /// starting at `offsets`.
    ///
    /// Each pair is `(-offset, -(x - out - offset))`, never positive for a
    /// window that fits.
    ///
    /// # Errors
    ///
    /// - [`CropError::OffsetsLength`] if `offsets.len() != x_dims.len()`
    /// - [`CropError::RankMismatch`] if the ranks differ from each other or from `D`
    /// - [`CropError::OutOfRange`] if the window escapes `x_dims` on some axis
    pub fn for_crop(x_dims: &[usize], out_dims: &[usize], offsets: &[i64]) -> Result<Self> {
        check_window::<D>(x_dims, out_dims, offsets)?;
        let mut pads = Self::default();
        for (i, pad) in pads.0.iter_mut().enumerate() {
            let (x, out, off) = signed(x_dims[i], out_dims[i], offsets[i]);
            *pad = Padding::new(-off, -(x - out - off));
        }
        Ok(pads)
    }

    /// Builds the descriptor that places a `d_out_dims` gradient inside a
    /// zero-filled `d_x_dims` tensor at `offsets`.
    ///
    /// Each pair is `(offset, d_x - d_out - offset)`, the sign flip of
    /// [`Paddings::for_crop`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Paddings::for_crop`], with `d_x_dims` as the
    /// larger tensor.
    pub fn for_crop_grad(d_x_dims: &[usize], d_out_dims: &[usize], offsets: &[i64]) -> Result<Self> {
        check_window::<D>(d_x_dims, d_out_dims, offsets)?;
        let mut pads = Self::default();
        for (i, pad) in pads.0.iter_mut().enumerate() {
            let (d_x, d_out, off) = signed(d_x_dims[i], d_out_dims[i], offsets[i]);
            *pad = Padding::new(off, d_x - d_out - off);
        }
        Ok(pads)
    }
}

/// Validates a window of `inner` placed at `offsets` inside `outer`.
fn check_window<const D: usize>(outer: &[usize], inner: &[usize], offsets: &[i64]) -> Result<()> {
    if offsets.len() != outer.len() {
        return Err(CropError::OffsetsLength {
            offsets: offsets.len(),
            rank: outer.len(),
        });
    }
    if inner.len() != outer.len() {
        return Err(CropError::RankMismatch {
            input: outer.len(),
            output: inner.len(),
        });
    }
    if outer.len() != D {
        return Err(CropError::RankMismatch {
            input: outer.len(),
            output: D,
        });
    }

    for (axis, ((&dim, &extent), &offset)) in outer.iter().zip(inner).zip(offsets).enumerate() {
        let fits = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(extent))
            .is_some_and(|end| end <= dim);
        if !fits {
            return Err(CropError::OutOfRange {
                axis,
                offset,
                extent,
                dim,
            });
        }
    }
    Ok(())
}

// window was validated, so every value fits in an isize
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn signed(outer: usize, inner: usize, offset: i64) -> (isize, isize, isize) {
    (outer as isize, inner as isize, offset as isize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_descriptor_is_non_positive() {
        let pads = Paddings::<2>::for_crop(&[4, 5], &[2, 3], &[1, 0]).unwrap();
        assert_eq!(pads.0, [Padding::new(-1, -1), Padding::new(0, -2)]);
        assert_eq!(pads.apply(&[4, 5]), Some(vec![2, 3]));
    }

    #[test]
    fn grad_descriptor_flips_sign() {
        let pads = Paddings::<2>::for_crop_grad(&[4, 5], &[2, 3], &[1, 0]).unwrap();
        assert_eq!(pads.0, [Padding::new(1, 1), Padding::new(0, 2)]);
        assert_eq!(pads.apply(&[2, 3]), Some(vec![4, 5]));
    }

    #[test]
    fn identity_for_full_window() {
        let pads = Paddings::<3>::for_crop(&[2, 3, 4], &[2, 3, 4], &[0, 0, 0]).unwrap();
        assert!(pads.is_identity());
    }

    #[test]
    fn offsets_length_is_checked_both_ways() {
        let err = Paddings::<2>::for_crop(&[4, 4], &[2, 2], &[1]).unwrap_err();
        assert_eq!(err, CropError::OffsetsLength { offsets: 1, rank: 2 });

        let err = Paddings::<2>::for_crop_grad(&[4, 4], &[2, 2], &[1, 1, 1]).unwrap_err();
        assert_eq!(err, CropError::OffsetsLength { offsets: 3, rank: 2 });
    }

    #[test]
    fn rejects_negative_and_overflowing_windows() {
        let err = Paddings::<2>::for_crop(&[4, 4], &[2, 2], &[-1, 0]).unwrap_err();
        assert!(matches!(err, CropError::OutOfRange { axis: 0, offset: -1, .. }));

        let err = Paddings::<2>::for_crop(&[4, 4], &[2, 2], &[0, 3]).unwrap_err();
        assert_eq!(
            err,
            CropError::OutOfRange {
                axis: 1,
                offset: 3,
                extent: 2,
                dim: 4
            }
        );

        let err = Paddings::<1>::for_crop_grad(&[4], &[5], &[0]).unwrap_err();
        assert!(matches!(err, CropError::OutOfRange { axis: 0, .. }));
    }

    #[test]
    fn rank_mismatch_between_tensors() {
        let err = Paddings::<2>::for_crop(&[4, 4], &[4], &[0, 0]).unwrap_err();
        assert_eq!(err, CropError::RankMismatch { input: 2, output: 1 });
    }

    #[test]
    fn negative_extent_is_rejected_by_apply() {
        let pads = Paddings([Padding::new(-3, -2)]);
        assert_eq!(pads.apply(&[4]), None);
        assert_eq!(pads.apply(&[5]), Some(vec![0]));
    }
}
