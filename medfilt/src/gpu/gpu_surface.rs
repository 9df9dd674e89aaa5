use super::Gpu;
use crate::common::Result;
use crate::image::GrayImage;

pub(crate) const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

const BYTES_PER_SAMPLE: u32 = std::mem::size_of::<f32>() as u32;

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// Row pitch of a texture-to-buffer readback, padded to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub(super) fn padded_row_bytes(width: u32) -> u32 {
    align_to(width * BYTES_PER_SAMPLE, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Image samples stored on the GPU as a single-channel `R32Float` 2-D texture.
///
/// Sampled reads go through the texture view; kernels write through the same
/// texture bound as a write-only storage texture.
#[derive(Debug)]
pub struct GpuSurface {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    extent: wgpu::Extent3d,
}

impl GpuSurface {
    /// Allocates an uninitialized surface.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedExtent`](crate::Error::UnsupportedExtent) when the
    /// size is zero or beyond the device's texture limits.
    pub fn new_empty(ctx: &Gpu, width: u32, height: u32) -> Result<Self> {
        ctx.check_surface_size(width, height)?;

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("gpu_surface_texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SURFACE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            extent,
        })
    }

    /// Creates a surface and uploads `image` into it.
    pub fn from_image(ctx: &Gpu, image: &GrayImage) -> Result<Self> {
        let surface = Self::new_empty(ctx, image.width(), image.height())?;

        ctx.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &surface.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(image.samples()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width() * BYTES_PER_SAMPLE),
                rows_per_image: Some(image.height()),
            },
            surface.extent,
        );

        Ok(surface)
    }

    /// Downloads the texture, blocking until every queued write to it has finished.
    ///
    /// Texture-to-buffer copies need rows padded to `COPY_BYTES_PER_ROW_ALIGNMENT`;
    /// the padding is stripped here.
    pub fn to_image(&self, ctx: &Gpu) -> Result<GrayImage> {
        let row_bytes = self.extent.width * BYTES_PER_SAMPLE;
        let padded_row_bytes = padded_row_bytes(self.extent.width);
        let size = padded_row_bytes as u64 * self.extent.height as u64;

        let staging_buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_surface_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gpu_surface_download_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(self.extent.height),
                },
            },
            self.extent,
        );
        ctx.queue().submit(std::iter::once(encoder.finish()));

        let bytes = ctx.read_staging(&staging_buffer)?;

        let mut samples = Vec::with_capacity((self.extent.width * self.extent.height) as usize);
        for row in bytes.chunks_exact(padded_row_bytes as usize) {
            samples.extend(super::samples_from_bytes(&row[..row_bytes as usize]));
        }

        GrayImage::new_with_data(self.extent.width, self.extent.height, samples)
    }

    pub fn width(&self) -> u32 {
        self.extent.width
    }

    pub fn height(&self) -> u32 {
        self.extent.height
    }
}
