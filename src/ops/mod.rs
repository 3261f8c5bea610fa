//! # Operation Dispatch Layer
//!
//! The elementwise pad primitive behind both crop directions, implemented per
//! backend and selected at runtime.
//!
//! ## Submodules
//!
//! - [`cpu`]: Multi-threaded CPU kernel (default fallback backend)
//! - [`wgpu`] *(opt-in)*: GPU compute shader pipeline using `wgpu`
//! - [`cuda`] *(planned)*: CUDA GPU backend for NVIDIA (dispatches to WebGPU)
//! - [`dispatch`]: Shape checks and dynamic backend switching
//!
//! ## Extending the Backend
//!
//! To add a new backend:
//!
//! 1. Implement `pad` for it, returning `false` for requests it declines
//! 2. Add it to [`dispatch::pad`] ahead of the CPU fallback
//! 3. Keep shape/consistency checks in `dispatch`, not in the backend
//!
//! ## Feature Flags
//!
//! - `wgpu`: Enables `wgpu` (WebGPU) backend
//! - `cuda`: Enables placeholder CUDA module (dispatches to WGPU)

pub mod cpu;
pub mod dispatch;

#[cfg(feature = "cuda")]
pub mod cuda;
#[cfg(any(feature = "wgpu", feature = "cuda"))]
pub mod wgpu;
