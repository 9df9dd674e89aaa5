use std::time::Duration;

use wgpu::util::DeviceExt;

use super::pipeline::GpuMedianBufferPipeline;
use super::{MedianFilter, Params, check_dispatch};
use crate::common::{Error, Result};
use crate::gpu::{Gpu, GpuSamples};

/// Runs the buffer kernel and blocks until it has finished.
pub(super) fn apply(
    filter: &MedianFilter,
    ctx: &Gpu,
    pipeline: &GpuMedianBufferPipeline,
    input: &GpuSamples,
    output: &mut GpuSamples,
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
        label: Some("median_buffer_params_buffer"),
        contents: bytemuck::cast_slice(&[uniform_params]),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("median_buffer_bind_group"),
        layout: &pipeline.bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: input.buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: output.buffer.as_entire_binding(),
            },
        ],
    });

    ctx.dispatch(
        "median_buffer_pass",
        &pipeline.compute_pipeline,
        &bind_group,
        groups,
    )
}
