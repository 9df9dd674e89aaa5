mod report;

use std::fmt;
use std::time::{Duration, Instant};

pub use report::Comparison;

use crate::common::Result;
use crate::config::BenchConfig;
use crate::extent::{self, NormalizedExtent};
use crate::gpu::{Gpu, GpuSamples, GpuSurface};
use crate::image::GrayImage;
use crate::ops::{GpuMedianBufferPipeline, GpuMedianSurfacePipeline, MedianFilter};
use crate::tiler;

/// One of the three realizations of the median filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPath {
    Cpu,
    GpuBuffer,
    GpuSurface,
}

impl FilterPath {
    pub const ALL: [FilterPath; 3] = [FilterPath::Cpu, FilterPath::GpuBuffer, FilterPath::GpuSurface];

    pub fn name(&self) -> &'static str {
        match self {
            FilterPath::Cpu => "cpu",
            FilterPath::GpuBuffer => "gpu buffer",
            FilterPath::GpuSurface => "gpu image",
        }
    }

    /// Output file name for this path, as configured.
    pub fn output_name<'a>(&self, config: &'a BenchConfig) -> &'a str {
        match self {
            FilterPath::Cpu => &config.output_cpu,
            FilterPath::GpuBuffer => &config.output_gpu_buffer,
            FilterPath::GpuSurface => &config.output_gpu_surface,
        }
    }
}

impl fmt::Display for FilterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of running one path: its output image and the filter time.
#[derive(Debug, Clone)]
pub struct PathRun {
    pub path: FilterPath,
    pub output: GrayImage,
    pub elapsed: Duration,
}

/// Normalized extent and the tiled image every path filters.
#[derive(Debug, Clone)]
pub struct TiledInput {
    pub extent: NormalizedExtent,
    pub image: GrayImage,
}

/// Validates `config`, then normalizes and tiles `raw`.
///
/// Needs no GPU, so degenerate input is rejected before a backend is acquired.
pub fn prepare(config: &BenchConfig, raw: &GrayImage) -> Result<TiledInput> {
    config.validate()?;

    let extent = extent::normalize(config.tile, raw.width(), raw.height())?;
    let (tiles_x, tiles_y) = extent.tile_grid(config.tile);
    log::info!(
        "Normalized {}x{} to {}x{} ({} samples, {} bytes, {}x{} tiles)",
        raw.width(),
        raw.height(),
        extent.width,
        extent.height,
        extent.count,
        extent.byte_size,
        tiles_x,
        tiles_y
    );

    let image = tiler::tile(raw, &extent)?;

    Ok(TiledInput { extent, image })
}

/// Normalizes and tiles `raw`, then filters it on all three paths.
///
/// Every path sees the same tiled input. Nothing is written to disk here; the
/// caller saves outputs once the whole comparison has succeeded.
pub fn run(ctx: &Gpu, config: &BenchConfig, raw: &GrayImage) -> Result<Comparison> {
    let input = prepare(config, raw)?;
    run_prepared(ctx, config, &input)
}

/// Filters an already tiled input on all three paths.
///
/// The extent is checked against the device limits before any path runs.
pub fn run_prepared(ctx: &Gpu, config: &BenchConfig, input: &TiledInput) -> Result<Comparison> {
    let extent = input.extent;
    ctx.check_extent(extent.width, extent.height, config.tile)?;

    let filter = MedianFilter::new(config.kernel_size)?;

    let cpu = run_cpu(&filter, &input.image);
    log::info!("CPU median: {:?}", cpu.elapsed);

    let gpu_buffer = run_gpu_buffer(ctx, config, &filter, &input.image)?;
    log::info!("GPU buffer median: {:?}", gpu_buffer.elapsed);

    let gpu_surface = run_gpu_surface(ctx, config, &filter, &input.image)?;
    log::info!("GPU image median: {:?}", gpu_surface.elapsed);

    let comparison = Comparison::new(extent, filter.kernel_size(), cpu, gpu_buffer, gpu_surface);
    log_summary(ctx, &extent, &comparison);

    Ok(comparison)
}

fn run_cpu(filter: &MedianFilter, input: &GrayImage) -> PathRun {
    let start = Instant::now();
    let output = filter.apply_cpu(input);
    let elapsed = start.elapsed();

    PathRun {
        path: FilterPath::Cpu,
        output,
        elapsed,
    }
}

fn run_gpu_buffer(
    ctx: &Gpu,
    config: &BenchConfig,
    filter: &MedianFilter,
    input: &GrayImage,
) -> Result<PathRun> {
    let pipeline = GpuMedianBufferPipeline::new(ctx, config.tile, filter.kernel_size())?;

    let input_samples = GpuSamples::from_image(ctx, input)?;
    let mut output_samples = GpuSamples::new_empty(ctx, input.width(), input.height())?;
    let elapsed = filter.apply_gpu_buffer(ctx, &pipeline, &input_samples, &mut output_samples)?;

    Ok(PathRun {
        path: FilterPath::GpuBuffer,
        output: output_samples.to_image(ctx)?,
        elapsed,
    })
}

fn run_gpu_surface(
    ctx: &Gpu,
    config: &BenchConfig,
    filter: &MedianFilter,
    input: &GrayImage,
) -> Result<PathRun> {
    let pipeline = GpuMedianSurfacePipeline::new(ctx, config.tile, filter.kernel_size())?;

    let input_surface = GpuSurface::from_image(ctx, input)?;
    let mut output_surface = GpuSurface::new_empty(ctx, input.width(), input.height())?;
    let elapsed = filter.apply_gpu_surface(ctx, &pipeline, &input_surface, &mut output_surface)?;

    Ok(PathRun {
        path: FilterPath::GpuSurface,
        output: output_surface.to_image(ctx)?,
        elapsed,
    })
}

fn log_summary(ctx: &Gpu, extent: &NormalizedExtent, comparison: &Comparison) {
    let info = ctx.adapter_info();
    log::info!(
        "Adapter '{}' ({:?}), extent {}x{}, K={}",
        info.name,
        info.backend,
        extent.width,
        extent.height,
        comparison.kernel_size()
    );

    for path in [FilterPath::GpuBuffer, FilterPath::GpuSurface] {
        let mismatches = comparison.mismatches(path);
        if mismatches > 0 {
            log::warn!(
                "{} output differs from cpu in {} of {} samples",
                path,
                mismatches,
                extent.count
            );
        } else {
            log::debug!("{} output matches cpu", path);
        }
    }
}
