//! GPU-accelerated pad kernel using WGPU.
//!
//! One WGSL compute shader (`shaders/pad.wgsl`) implements the signed pad for
//! any rank up to 6: every invocation computes a single output element,
//! either copied from its source coordinate or set to the fill value.
//!
//! The device, queue and pipeline are built once, lazily, via `lazy_static`.
//! If no adapter is available the context stays empty and every request
//! falls back to the CPU kernel; nothing here panics on a missing GPU.
//!
//! Only `f32` tensors run on the GPU. Other element types, empty tensors and
//! shapes that do not fit in `i32` are declined the same way.

use crate::paddings::Paddings;
use crate::rank::MAX_RANK;
use crate::tensors::{Element, Tensor};
use std::sync::mpsc;
use wgpu::util::DeviceExt;

const PAD: &str = include_str!("shaders/pad.wgsl");

const WORKGROUP_SIZE: u32 = 64;
const MAX_GROUPS_PER_DIM: u32 = 65_535;

/// Basic wrapper for common GPU errors.
#[derive(Debug)]
pub enum GpuError {
    /// An error in requesting the adapter.
    Adapter(wgpu::RequestAdapterError),
    /// An error in requesting the GPU (device).
    Device(wgpu::RequestDeviceError),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Adapter(e) => write!(f, "Adapter error: {e}"),
            Self::Device(e) => write!(f, "Device error: {e}"),
        }
    }
}

/// A type of error closely related to the GPU.
#[derive(Debug)]
pub struct GpuFailure {
    /// The optional type of failure that occured.
    pub kind: Option<GpuError>,
    /// The optional message explaining the failure.
    pub message: Option<String>,
}

impl From<GpuError> for GpuFailure {
    fn from(kind: GpuError) -> Self {
        Self {
            kind: Some(kind),
            message: None,
        }
    }
}

impl From<&str> for GpuFailure {
    fn from(msg: &str) -> Self {
        Self {
            kind: None,
            message: Some(msg.to_string()),
        }
    }
}

impl From<wgpu::PollError> for GpuFailure {
    fn from(e: wgpu::PollError) -> Self {
        Self {
            kind: None,
            message: Some(format!("poll failed: {e:?}")),
        }
    }
}

impl From<bytemuck::PodCastError> for GpuFailure {
    fn from(e: bytemuck::PodCastError) -> Self {
        Self {
            kind: None,
            message: Some(format!("read-back cast failed: {e:?}")),
        }
    }
}

impl std::fmt::Display for GpuFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(kind) = &self.kind {
            write!(f, "GPU failure: {kind}")
        } else if let Some(msg) = &self.message {
            write!(f, "GPU failure: {msg}")
        } else {
            write!(f, "Unknown GPU failure")
        }
    }
}

impl std::error::Error for GpuFailure {}

/// Holds the WGPU device and queue used for executing compute pipelines.
///
/// Initialized once globally and reused for all operations via `lazy_static`.
pub struct GpuContext {
    /// The actual GPU device.
    pub device: wgpu::Device,
    /// A queue for information related to the device.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Initializes a new GPU context, selecting the default adapter and creating a device + queue.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError`] if adapter or device acquisition fails.
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .map_err(GpuError::Adapter)?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("briny_crop"),
            ..Default::default()
        }))
        .map_err(GpuError::Device)?;

        Ok(Self { device, queue })
    }
}

/// Compiled pad shader with its bind group layout.
struct PadPipeline {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl PadPipeline {
    fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pad"),
            source: wgpu::ShaderSource::Wgsl(PAD.into()),
        });

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pad_bgl"),
            entries: &[storage(0, true), storage(1, true), storage(2, false)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pad_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("pad_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            cache: None,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        Self { layout, pipeline }
    }
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: Option<GpuContext> = match GpuContext::new() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            log::warn!("no GPU available, pad runs on the CPU: {e}");
            None
        }
    };

    static ref PAD_PIPELINE: Option<PadPipeline> = GPU_CONTEXT.as_ref().map(PadPipeline::new);
}

/// Runs the pad on the GPU.
///
/// Returns `false` without touching `out` when the request cannot be served
/// here; the caller is expected to fall back to the CPU kernel.
pub fn wgpu_pad<T: Element, const D: usize>(
    input: &Tensor<T>,
    paddings: &Paddings<D>,
    value: T,
    out: &mut Tensor<T>,
) -> bool {
    let (Some(src), Some(fill)) = (
        T::as_f32(&input.data),
        T::as_f32(core::slice::from_ref(&value)).map(|v| v[0]),
    ) else {
        return false;
    };
    if src.is_empty() || out.data.is_empty() || D > MAX_RANK {
        return false;
    }
    let Some(params) = shader_params(&input.shape, &out.shape, paddings, fill) else {
        return false;
    };
    let (Some(ctx), Some(pipe)) = (GPU_CONTEXT.as_ref(), PAD_PIPELINE.as_ref()) else {
        return false;
    };
    let Some(dst) = T::as_f32_mut(&mut out.data) else {
        return false;
    };

    match run_pad_shader(ctx, pipe, &params, src, dst) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("wgpu pad failed, falling back to cpu: {e}");
            false
        }
    }
}

/// Packs shapes, low paddings and the fill value in the layout `pad.wgsl` reads.
fn shader_params<const D: usize>(
    in_shape: &[usize],
    out_shape: &[usize],
    paddings: &Paddings<D>,
    fill: f32,
) -> Option<Vec<i32>> {
    let mut params = vec![0i32; 3 * MAX_RANK + 3];
    params[0] = i32::try_from(D).ok()?;
    params[1] = i32::try_from(out_shape.iter().product::<usize>()).ok()?;
    for axis in 0..D {
        params[2 + axis] = i32::try_from(in_shape[axis]).ok()?;
        params[2 + MAX_RANK + axis] = i32::try_from(out_shape[axis]).ok()?;
        params[2 + 2 * MAX_RANK + axis] = i32::try_from(paddings.0[axis].low).ok()?;
    }
    params[2 + 3 * MAX_RANK] = bytemuck::cast(fill);
    Some(params)
}

fn run_pad_shader(
    ctx: &GpuContext,
    pipe: &PadPipeline,
    params: &[i32],
    input: &[f32],
    output: &mut [f32],
) -> Result<(), GpuFailure> {
    let device = &ctx.device;
    let out_bytes = (output.len() * size_of::<f32>()) as u64;
    let groups = u32::try_from(output.len())
        .map_err(|_| GpuFailure::from("output too large for one dispatch"))?
        .div_ceil(WORKGROUP_SIZE);

    let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pad_params"),
        contents: bytemuck::cast_slice(params),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let input_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pad_input"),
        contents: bytemuck::cast_slice(input),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let output_buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pad_output"),
        size: out_bytes,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pad_staging"),
        size: out_bytes,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("pad_bind_group"),
        layout: &pipe.layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: input_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: output_buf.as_entire_binding(),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("pad_encoder"),
    });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("pad_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipe.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        // large outputs spill into a second grid dimension
        let x = groups.min(MAX_GROUPS_PER_DIM);
        pass.dispatch_workgroups(x, groups.div_ceil(x), 1);
    }
    encoder.copy_buffer_to_buffer(&output_buf, 0, &staging, 0, out_bytes);
    ctx.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result.is_ok());
    });
    device.poll(wgpu::PollType::Wait)?;
    if rx.try_recv() != Ok(true) {
        return Err("staging buffer could not be mapped".into());
    }

    {
        let view = slice.get_mapped_range();
        output.copy_from_slice(bytemuck::try_cast_slice::<u8, f32>(&view)?);
    }
    staging.unmap();

    log::trace!("wgpu pad wrote {} elements", output.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paddings::Padding;

    #[test]
    fn params_follow_shader_layout() {
        let pads = Paddings([Padding::new(-1, -1), Padding::new(2, 0)]);
        let params = shader_params(&[4, 3], &[2, 5], &pads, 1.5).unwrap();
        assert_eq!(params.len(), 21);
        assert_eq!(&params[..2], &[2, 10]);
        assert_eq!(&params[2..4], &[4, 3]);
        assert_eq!(&params[8..10], &[2, 5]);
        assert_eq!(&params[14..16], &[-1, 2]);
        assert_eq!(params[20], 1.5f32.to_bits() as i32);
    }

    #[test]
    fn declines_non_f32_tensors() {
        let input = Tensor::new(vec![2], vec![1.0f64, 2.0]);
        let mut out = Tensor::zeros(vec![2]);
        assert!(!wgpu_pad(&input, &Paddings::<1>::default(), 0.0, &mut out));
        assert_eq!(out.data, vec![0.0, 0.0]);
    }

    #[test]
    fn gpu_pad_matches_cpu_when_available() {
        let input = Tensor::new(vec![3, 4], (0..12).map(|v| v as f32).collect::<Vec<_>>());
        let pads = Paddings([Padding::new(-1, 1), Padding::new(1, -2)]);
        let mut gpu = Tensor::zeros(vec![3, 3]);
        let mut cpu = Tensor::zeros(vec![3, 3]);
        crate::ops::cpu::pad(&input, &pads, 0.0, &mut cpu);
        if wgpu_pad(&input, &pads, 0.0, &mut gpu) {
            assert_eq!(gpu, cpu);
        }
    }
}
