mod buffer_gpu;
mod cpu;
mod pipeline;
mod surface_gpu;


use std::time::Duration;

use crate::common::{Error, Result};
use crate::extent::TileShape;
use crate::gpu::{Gpu, GpuSamples, GpuSurface};
use crate::image::GrayImage;

pub use pipeline::{GpuMedianBufferPipeline, GpuMedianSurfacePipeline};

/// Largest supported window edge. GPU kernels keep the K*K window in private memory.
pub const MAX_KERNEL_SIZE: u32 = 15;

pub(crate) fn validate_kernel_size(kernel_size: u32) -> Result<()> {
    if kernel_size % 2 == 0 || kernel_size > MAX_KERNEL_SIZE {
        return Err(Error::InvalidKernelSize(kernel_size));
    }
    Ok(())
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    width: u32,
    height: u32,
    _padding: [u32; 2],
}

impl Params {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            _padding: [0; 2],
        }
    }
}

/// Validates a launch and returns its work-group grid.
///
/// Rejects empty images so no zero-sized dispatch is ever issued, and grids the
/// device cannot launch.
fn check_dispatch(
    ctx: &Gpu,
    filter: &MedianFilter,
    pipeline_kernel_size: u32,
    tile: TileShape,
    width: u32,
    height: u32,
) -> Result<(u32, u32)> {
    if pipeline_kernel_size != filter.kernel_size {
        return Err(Error::Config(format!(
            "pipeline was built for kernel size {}, filter uses {}",
            pipeline_kernel_size, filter.kernel_size
        )));
    }

    if width == 0 || height == 0 {
        return Err(Error::DegenerateExtent {
            raw_width: width,
            raw_height: height,
            tile_width: tile.width,
            tile_height: tile.height,
        });
    }

    ctx.check_extent(width, height, tile)?;

    let groups = (width.div_ceil(tile.width), height.div_ceil(tile.height));
    log::debug!(
        "median dispatch: {}x{} samples, {}x{} tiles of {}x{}, K={}",
        width,
        height,
        groups.0,
        groups.1,
        tile.width,
        tile.height,
        filter.kernel_size
    );

    Ok(groups)
}

/// K x K median filter with clamp-to-edge boundary handling.
///
/// The same filter is realized three times: sequentially on the CPU, as a GPU
/// kernel over a linear storage buffer, and as a GPU kernel over a sampled
/// texture. All three produce identical output for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianFilter {
    kernel_size: u32,
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self { kernel_size: 5 }
    }
}

impl MedianFilter {
    /// Creates a filter with a `kernel_size x kernel_size` window.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKernelSize`] unless `kernel_size` is odd and at most
    /// [`MAX_KERNEL_SIZE`].
    pub fn new(kernel_size: u32) -> Result<Self> {
        validate_kernel_size(kernel_size)?;
        Ok(Self { kernel_size })
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }

    /// Applies the filter on the CPU, single-threaded. Reference output.
    pub fn apply_cpu(&self, input: &GrayImage) -> GrayImage {
        let samples = cpu::median_filter(
            input.samples(),
            self.kernel_size,
            input.width(),
            input.height(),
        );

        GrayImage::new_with_data(input.width(), input.height(), samples)
            .expect("median output has the input's shape")
    }

    /// Applies the filter with the linear-buffer GPU kernel.
    ///
    /// Blocks until the dispatch completes and returns its duration, measured on the
    /// device when timestamp queries are available.
    ///
    /// # Errors
    /// Fails if the buffers differ in size, are empty, or the pipeline was built for
    /// another kernel size.
    pub fn apply_gpu_buffer(
        &self,
        ctx: &Gpu,
        pipeline: &GpuMedianBufferPipeline,
        input: &GpuSamples,
        output: &mut GpuSamples,
    ) -> Result<Duration> {
        buffer_gpu::apply(self, ctx, pipeline, input, output)
    }

    /// Applies the filter with the surface GPU kernel.
    ///
    /// Blocks until the dispatch completes and returns its duration.
    pub fn apply_gpu_surface(
        &self,
        ctx: &Gpu,
        pipeline: &GpuMedianSurfacePipeline,
        input: &GpuSurface,
        output: &mut GpuSurface,
    ) -> Result<Duration> {
        surface_gpu::apply(self, ctx, pipeline, input, output)
    }
}
