//! The crop operator and its gradient operator.
//!
//! These tie the kernels in [`crop`](crate::crop) to an
//! [`ExecutionContext`]: they look up `X` (and `Y`), read the `offsets` and
//! `shape` attributes, allocate outputs and pick the backend.
//!
//! | operator       | inputs                 | attributes        | output    |
//! |----------------|------------------------|-------------------|-----------|
//! | [`CropOp`]     | `X`, optional `Y`      | `offsets`, `shape`| `Out`     |
//! | [`CropGradOp`] | `X`, `Out@GRAD`        | `offsets`         | `X@GRAD`  |
//!
//! The output shape of a crop is the shape of `Y` when given, else the
//! `shape` attribute. Missing `offsets` means the window starts at the origin.

use crate::context::{grad_var_name, ExecutionContext, OFFSETS, OUT, SHAPE, X, Y};
use crate::crop::{crop_grad_into, crop_into};
use crate::error::{CropError, Result};

/// An operator driven through an [`ExecutionContext`].
pub trait Operator {
    /// Allocates the outputs with their final shapes.
    ///
    /// # Errors
    /// Missing inputs/attributes or inconsistent shapes.
    fn infer_shape<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()>;

    /// Fills the already allocated outputs.
    ///
    /// # Errors
    /// Missing inputs/outputs or any kernel error.
    fn compute<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()>;

    /// Shape inference followed by computation.
    ///
    /// # Errors
    /// Whatever either stage reports.
    fn run<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()> {
        self.infer_shape(ctx)?;
        self.compute(ctx)
    }
}

/// Crops `X` to `Out`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropOp;

/// Scatters `Out@GRAD` into a zero-filled `X@GRAD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropGradOp;

impl Operator for CropOp {
    fn infer_shape<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()> {
        let x_rank = ctx.input(X)?.rank();
        let shape = if ctx.has_input(Y) {
            ctx.input(Y)?.shape.clone()
        } else {
            shape_attr(ctx.attr_ints(SHAPE)?)?
        };
        if shape.len() != x_rank {
            return Err(CropError::RankMismatch {
                input: x_rank,
                output: shape.len(),
            });
        }
        ctx.allocate_output(OUT, &shape)
    }

    fn compute<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()> {
        let backend = ctx.backend();
        let rank = ctx.input(X)?.rank();
        let offsets = offsets_or_origin(ctx, rank)?;
        let (x, out) = ctx.io(X, OUT)?;
        log::debug!("crop {:?} -> {:?} at {offsets:?}", x.shape, out.shape);
        crop_into(backend, x, &offsets, out)
    }
}

impl Operator for CropGradOp {
    fn infer_shape<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()> {
        let x_shape = ctx.input(X)?.shape.clone();
        ctx.allocate_output(&grad_var_name(X), &x_shape)
    }

    fn compute<C: ExecutionContext>(&self, ctx: &mut C) -> Result<()> {
        let backend = ctx.backend();
        let d_out_name = grad_var_name(OUT);
        let rank = ctx.input(&d_out_name)?.rank();
        let offsets = offsets_or_origin(ctx, rank)?;
        let (d_out, d_x) = ctx.io(&d_out_name, &grad_var_name(X))?;
        log::debug!("crop grad {:?} -> {:?} at {offsets:?}", d_out.shape, d_x.shape);
        crop_grad_into(backend, d_out, &offsets, d_x)
    }
}

fn offsets_or_origin<C: ExecutionContext>(ctx: &C, rank: usize) -> Result<Vec<i64>> {
    match ctx.attr_ints(OFFSETS) {
        Ok(offsets) => Ok(offsets.to_vec()),
        Err(CropError::MissingAttr(_)) => Ok(vec![0; rank]),
        Err(e) => Err(e),
    }
}

fn shape_attr(values: &[i64]) -> Result<Vec<usize>> {
    values
        .iter()
        .map(|&value| usize::try_from(value).map_err(|_| CropError::InvalidShapeAttr { value }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::context::LocalContext;
    use crate::tensors::Tensor;

    fn x_4x4() -> Tensor<f32> {
        Tensor::new(vec![4, 4], (0..16).map(|v| v as f32).collect())
    }

    #[test]
    fn crop_from_shape_attribute() {
        let mut ctx = LocalContext::new()
            .with_backend(Backend::Cpu)
            .with_input(X, x_4x4())
            .with_attr(OFFSETS, vec![1, 1])
            .with_attr(SHAPE, vec![2, 2]);
        CropOp.run(&mut ctx).unwrap();
        assert_eq!(ctx.output(OUT).unwrap().data, vec![5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn reference_tensor_overrides_shape_attribute() {
        let mut ctx = LocalContext::new()
            .with_backend(Backend::Cpu)
            .with_input(X, x_4x4())
            .with_input(Y, Tensor::zeros(vec![3, 1]))
            .with_attr(OFFSETS, vec![0, 3])
            .with_attr(SHAPE, vec![2, 2]);
        CropOp.run(&mut ctx).unwrap();
        let out = ctx.output(OUT).unwrap();
        assert_eq!(out.shape, vec![3, 1]);
        assert_eq!(out.data, vec![3.0, 7.0, 11.0]);
    }

    #[test]
    fn missing_offsets_start_at_origin() {
        let mut ctx = LocalContext::new()
            .with_backend(Backend::Cpu)
            .with_input(X, x_4x4())
            .with_attr(SHAPE, vec![1, 3]);
        CropOp.run(&mut ctx).unwrap();
        assert_eq!(ctx.output(OUT).unwrap().data, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn shape_rank_must_match_input() {
        let mut ctx = LocalContext::new()
            .with_input(X, x_4x4())
            .with_attr(SHAPE, vec![2]);
        let err = CropOp.infer_shape(&mut ctx).unwrap_err();
        assert_eq!(err, CropError::RankMismatch { input: 2, output: 1 });
    }

    #[test]
    fn negative_shape_attribute_is_rejected() {
        let mut ctx = LocalContext::new()
            .with_input(X, x_4x4())
            .with_attr(SHAPE, vec![2, -1]);
        let err = CropOp.infer_shape(&mut ctx).unwrap_err();
        assert_eq!(err, CropError::InvalidShapeAttr { value: -1 });
    }

    #[test]
    fn missing_shape_source_is_reported() {
        let mut ctx = LocalContext::new().with_input(X, x_4x4());
        let err = CropOp.infer_shape(&mut ctx).unwrap_err();
        assert_eq!(err, CropError::MissingAttr(SHAPE.into()));
    }

    #[test]
    fn gradient_operator_scatters_into_x_shape() {
        let mut ctx = LocalContext::new()
            .with_backend(Backend::Cpu)
            .with_input(X, x_4x4())
            .with_input(grad_var_name(OUT), Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]))
            .with_attr(OFFSETS, vec![2, 0]);
        CropGradOp.run(&mut ctx).unwrap();
        let d_x = ctx.take_output(&grad_var_name(X)).unwrap();
        assert_eq!(d_x.shape, vec![4, 4]);
        #[rustfmt::skip]
        let expected = vec![
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
            1.0, 2.0, 0.0, 0.0,
            3.0, 4.0, 0.0, 0.0,
        ];
        assert_eq!(d_x.data, expected);
    }

    #[test]
    fn compute_without_allocation_fails() {
        let mut ctx = LocalContext::new()
            .with_input(X, x_4x4())
            .with_attr(OFFSETS, vec![0, 0]);
        let err = CropOp.compute(&mut ctx).unwrap_err();
        assert_eq!(err, CropError::MissingOutput(OUT.into()));
    }
}
