//! briny_crop: n-dimensional tensor crop and crop-gradient kernels in Rust.
//!
//! A crop extracts an axis-aligned window from a tensor. Its gradient writes
//! an incoming gradient back into a zero-filled tensor of the original shape.
//! Both are expressed as one pad primitive with signed per-axis amounts, which
//! runs on the CPU with Rayon or, when enabled, on the GPU through `wgpu`.
//!
//! # Features
//!
//! - Ranks 1 through 6, chosen at runtime and specialized at compile time.
//! - Any [`Element`](tensors::Element) type: floats and fixed-width integers.
//! - Operator surface ([`operator::CropOp`], [`operator::CropGradOp`]) driven
//!   through an [`ExecutionContext`](context::ExecutionContext).
//! - Closure-style autograd in [`backprop`].
//! - Optional `wgpu` / `cuda` features with transparent CPU fallback.
//!
//! # Modules
//!
//! - [`tensors`]: tensor storage and the element trait.
//! - [`paddings`]: per-axis pad descriptors and the crop/gradient conversions.
//! - [`rank`]: runtime rank to const-generic rank dispatch.
//! - [`ops`]: the backend-dispatched pad primitive.
//! - [`crop`]: crop and crop-gradient kernels.
//! - [`context`], [`operator`]: the operator-level interface.
//! - [`backprop`]: differentiable crop.
//! - [`backend`], [`error`]: backend selection and error types.
//!
//! # Example
//!
//! ```rust
//! use briny_crop::tensor;
//!
//! let x = tensor!([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
//! let out = briny_crop::crop::crop_tensor(&x, &[1, 1], &[2, 2])?;
//! assert_eq!(out.data, vec![5, 6, 8, 9]);
//! # Ok::<(), briny_crop::error::CropError>(())
//! ```

pub mod backend;
pub mod backprop;
pub mod context;
pub mod crop;
pub mod error;
pub mod operator;
pub mod ops;
pub mod paddings;
pub mod rank;
pub mod tensors;

pub use backend::{get_backend, set_backend, Backend};
pub use error::{CropError, Result};
pub use tensors::{Element, Tensor};
