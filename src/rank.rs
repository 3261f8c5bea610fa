//! Runtime rank to compile-time rank dispatch.
//!
//! Pad descriptors are fixed-size arrays, so every kernel is monomorphized per
//! rank. [`dispatch_rank`] is the single switch that turns a rank only known
//! at runtime into a call of the matching `const D: usize` instantiation.

use crate::error::{CropError, Result};

/// Highest rank with a specialized kernel.
pub const MAX_RANK: usize = 6;

/// A computation that can be instantiated for any fixed rank.
///
/// Implementors carry their arguments as fields and receive the rank as a
/// const generic parameter.
pub trait RankKernel {
    /// What the kernel produces.
    type Output;

    /// Runs the kernel specialized for rank `D`.
    fn run<const D: usize>(self) -> Self::Output;
}

/// Runs `kernel` specialized for `rank`.
///
/// # Errors
///
/// Returns [`CropError::UnsupportedRank`] for any rank outside `1..=6`; the
/// kernel is not run.
pub fn dispatch_rank<K: RankKernel>(rank: usize, kernel: K) -> Result<K::Output> {
    log::trace!("dispatching rank {rank}");
    match rank {
        1 => Ok(kernel.run::<1>()),
        2 => Ok(kernel.run::<2>()),
        3 => Ok(kernel.run::<3>()),
        4 => Ok(kernel.run::<4>()),
        5 => Ok(kernel.run::<5>()),
        6 => Ok(kernel.run::<6>()),
        _ => {
            log::error!("only ranks up to {MAX_RANK} supported, got {rank}");
            Err(CropError::UnsupportedRank { rank })
        }
    }
}
