//! Backend selection module.
//!
//! This module defines the execution backends a pad/crop can run on and
//! provides functions to set and get the process-wide default.
//!
//! # Supported Backends
//!
//! - `Cpu`: Pure Rust, parallelized with `rayon` (default).
//! - `Wgpu`: WGSL compute shader via `wgpu` (feature `wgpu`, `f32` only).
//! - `Cuda`: Placeholder; currently routed through the `wgpu` kernel.
//!
//! Whenever a GPU backend is selected but cannot serve a request (feature
//! disabled, no adapter, non-`f32` data), the CPU kernel runs instead.
//!
//! An [`ExecutionContext`](crate::context::ExecutionContext) may carry its own
//! backend; the global default only applies where none was chosen.

use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};

/// Enumeration of supported computation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// Pure CPU-based backend (default).
    #[default]
    Cpu = 0,
    /// GPU-accelerated backend using `wgpu`.
    Wgpu = 1,
    /// Placeholder for future CUDA support.
    Cuda = 2,
}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cpu),
            1 => Ok(Self::Wgpu),
            2 => Ok(Self::Cuda),
            _ => Err(()),
        }
    }
}

/// Internal global state for the active backend.
///
/// The backend is only expected to change between invocations, never
/// while a kernel is running.
static GLOBAL_DEFAULT_BACKEND: AtomicU8 = AtomicU8::new(Backend::Cpu as u8);

/// Sets the default backend used by contexts that do not choose one.
///
/// # Example
///
/// ```
/// use briny_crop::backend::{get_backend, set_backend, Backend};
/// set_backend(Backend::Cpu);
/// assert_eq!(get_backend(), Backend::Cpu);
/// ```
pub fn set_backend(b: Backend) {
    log::debug!("default backend set to {b:?}");
    GLOBAL_DEFAULT_BACKEND.store(b as u8, Ordering::Release);
}

/// Returns the currently active default backend.
///
/// If the stored value is invalid, defaults to [`Backend::Cpu`].
#[must_use]
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_DEFAULT_BACKEND.load(Ordering::Acquire)).unwrap_or_default()
}
