use std::time::Duration;

use wgpu::util::DeviceExt;

use super::pipeline::GpuMedianSurfacePipeline;
use super::{MedianFilter, Params, check_dispatch};
use crate::common::{Error, Result};
use crate::gpu::{Gpu, GpuSurface};

/// Runs the surface kernel and blocks until it has finished.
pub(super) fn apply(
    filter: &MedianFilter,
    ctx: &Gpu,
    pipeline: &GpuMedianSurfacePipeline,
    input: &GpuSurface,
    output: &mut GpuSurface,
) -> Result<Duration> {
    if (input.width(), input.height()) != (output.width(), output.height()) {
        return Err(Error::SizeMismatch(format!(
            "input {}x{} vs output {}x{}",
            input.width(),
            input.height(),
            output.width(),
            output.height()
        )));
    }

    let groups = check_dispatch(
        ctx,
        filter,
        pipeline.kernel_size,
        pipeline.tile,
        input.width(),
        input.height(),
    )?;

    let device = ctx.device();

    let uniform_params = Params::new(input.width(), input.height());
    let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("median_surface_params_buffer"),
        contents: bytemuck::cast_slice(&[uniform_params]),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("median_surface_bind_group"),
        layout: &pipeline.bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&input.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&output.view),
            },
        ],
    });

    ctx.dispatch(
        "median_surface_pass",
        &pipeline.compute_pipeline,
        &bind_group,
        groups,
    )
}
