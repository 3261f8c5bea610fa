//! Error types for crop and crop-gradient kernels.
//!
//! Every precondition the kernels check is surfaced through [`CropError`].
//! Nothing is logged and then ignored: a failed check aborts the invocation
//! and leaves the output tensor as it was.

use thiserror::Error;

/// Result type alias using [`CropError`].
pub type Result<T> = core::result::Result<T, CropError>;

/// Errors that can occur while preparing or running a crop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    /// The offsets list does not have one entry per axis.
    #[error("offsets size {offsets} should be equal to dimension size {rank} of input tensor")]
    OffsetsLength {
        /// Number of offsets supplied.
        offsets: usize,
        /// Rank of the tensor being cropped (or scattered into).
        rank: usize,
    },

    /// No kernel is specialized for this rank.
    #[error("only ranks 1 through {max} are supported, got rank {rank}", max = crate::rank::MAX_RANK)]
    UnsupportedRank {
        /// The rejected rank.
        rank: usize,
    },

    /// Input and output tensors have a different number of axes.
    #[error("rank mismatch: input has {input} axes, output has {output}")]
    RankMismatch {
        /// Rank of the input tensor.
        input: usize,
        /// Rank of the output tensor.
        output: usize,
    },

    /// The crop window does not fit inside the larger tensor along `axis`.
    #[error("window [{offset}, {offset} + {extent}) on axis {axis} exceeds dimension {dim}")]
    OutOfRange {
        /// The offending axis.
        axis: usize,
        /// Start of the window on that axis.
        offset: i64,
        /// Length of the window on that axis.
        extent: usize,
        /// Size of the larger tensor on that axis.
        dim: usize,
    },

    /// The output tensor's shape disagrees with the padding descriptor.
    #[error("output shape mismatch: expected {expected:?}, got {got:?}")]
    OutputShape {
        /// Shape implied by the input and the descriptor.
        expected: Vec<usize>,
        /// Shape of the output actually supplied.
        got: Vec<usize>,
    },

    /// A tensor's data length disagrees with its shape.
    #[error("shape implies {expected} elements but {got} were supplied")]
    DataLength {
        /// Product of the shape.
        expected: usize,
        /// Length of the data buffer.
        got: usize,
    },

    /// A named input was not found in the execution context.
    #[error("input `{0}` not found")]
    MissingInput(String),

    /// A named output was not allocated in the execution context.
    #[error("output `{0}` not allocated")]
    MissingOutput(String),

    /// A named attribute was not found in the execution context.
    #[error("attribute `{0}` not found")]
    MissingAttr(String),

    /// The `shape` attribute holds a value that is not a valid extent.
    #[error("invalid extent {value} in shape attribute")]
    InvalidShapeAttr {
        /// The rejected extent.
        value: i64,
    },
}
