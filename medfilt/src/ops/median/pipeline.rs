use crate::common::{Error, Result};
use crate::extent::TileShape;
use crate::gpu::{Gpu, SURFACE_FORMAT};

const MEDIAN_BUFFER_SHADER: &str = include_str!("median_buffer.wgsl");
const MEDIAN_SURFACE_SHADER: &str = include_str!("median_surface.wgsl");

/// Substitutes the work-group shape and window size into kernel text.
pub(super) fn specialize(source: &str, tile: TileShape, kernel_size: u32) -> String {
    source
        .replace("{{TILE_WIDTH}}", &tile.width.to_string())
        .replace("{{TILE_HEIGHT}}", &tile.height.to_string())
        .replace("{{RADIUS}}", &(kernel_size / 2).to_string())
        .replace("{{WINDOW_LEN}}", &(kernel_size * kernel_size).to_string())
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Compiles `source` into a compute pipeline, turning validation errors into
/// [`Error::KernelBuildFailure`] instead of letting wgpu panic.
fn build_compute_pipeline(
    ctx: &Gpu,
    name: &str,
    source: String,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> Result<wgpu::ComputePipeline> {
    let device = ctx.device();

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(name),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(name),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(Error::KernelBuildFailure(format!("{}: {}", name, err)));
    }

    log::debug!("Built compute pipeline '{}'", name);

    Ok(compute_pipeline)
}

/// Cached GPU pipeline for the linear-buffer median kernel.
/// Specialized for one tile shape and kernel size; create once and reuse.
#[derive(Debug)]
pub struct GpuMedianBufferPipeline {
    pub(super) compute_pipeline: wgpu::ComputePipeline,
    pub(super) bind_group_layout: wgpu::BindGroupLayout,
    pub(super) tile: TileShape,
    pub(super) kernel_size: u32,
}

impl GpuMedianBufferPipeline {
    pub fn new(ctx: &Gpu, tile: TileShape, kernel_size: u32) -> Result<Self> {
        super::validate_kernel_size(kernel_size)?;
        ctx.check_tile(tile)?;

        let bind_group_layout =
            ctx.device()
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("median_buffer_bind_group_layout"),
                    entries: &[
                        // Params uniform
                        uniform_entry(0),
                        // Input samples
                        storage_entry(1, true),
                        // Output samples
                        storage_entry(2, false),
                    ],
                });

        let compute_pipeline = build_compute_pipeline(
            ctx,
            "median_buffer_pipeline",
            specialize(MEDIAN_BUFFER_SHADER, tile, kernel_size),
            &bind_group_layout,
        )?;

        Ok(Self {
            compute_pipeline,
            bind_group_layout,
            tile,
            kernel_size,
        })
    }

    pub fn tile(&self) -> TileShape {
        self.tile
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }
}

/// Cached GPU pipeline for the surface (texture) median kernel.
///
/// Owns the clamp-to-edge sampler that gives the kernel its boundary handling.
#[derive(Debug)]
pub struct GpuMedianSurfacePipeline {
    pub(super) compute_pipeline: wgpu::ComputePipeline,
    pub(super) bind_group_layout: wgpu::BindGroupLayout,
    pub(super) sampler: wgpu::Sampler,
    pub(super) tile: TileShape,
    pub(super) kernel_size: u32,
}

impl GpuMedianSurfacePipeline {
    pub fn new(ctx: &Gpu, tile: TileShape, kernel_size: u32) -> Result<Self> {
        super::validate_kernel_size(kernel_size)?;
        ctx.check_tile(tile)?;

        let device = ctx.device();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("median_surface_bind_group_layout"),
            entries: &[
                // Params uniform
                uniform_entry(0),
                // Input surface
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                // Clamp-to-edge sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
                // Output surface
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: SURFACE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("median_surface_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let compute_pipeline = build_compute_pipeline(
            ctx,
            "median_surface_pipeline",
            specialize(MEDIAN_SURFACE_SHADER, tile, kernel_size),
            &bind_group_layout,
        )?;

        Ok(Self {
            compute_pipeline,
            bind_group_layout,
            sampler,
            tile,
            kernel_size,
        })
    }

    pub fn tile(&self) -> TileShape {
        self.tile
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialize_replaces_all_placeholders() {
        let tile = TileShape::new(16, 8).unwrap();

        for source in [MEDIAN_BUFFER_SHADER, MEDIAN_SURFACE_SHADER] {
            let specialized = specialize(source, tile, 5);

            assert!(!specialized.contains("{{"), "unreplaced placeholder");
            assert!(specialized.contains("@workgroup_size(16, 8, 1)"));
            assert!(specialized.contains("const RADIUS: i32 = 2;"));
            assert!(specialized.contains("array<f32, 25>"));
        }
    }
}
