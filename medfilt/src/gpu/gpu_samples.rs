use wgpu::util::DeviceExt;

use super::Gpu;
use crate::common::Result;
use crate::image::GrayImage;

/// Image samples stored on the GPU as a flat `f32` storage buffer.
#[derive(Debug)]
pub struct GpuSamples {
    pub(crate) buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl GpuSamples {
    /// Uploads `image` into a new storage buffer.
    pub fn from_image(ctx: &Gpu, image: &GrayImage) -> Result<Self> {
        ctx.check_samples_size(image.width(), image.height())?;

        let buffer = ctx
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gpu_samples_buffer"),
                contents: bytemuck::cast_slice(image.samples()),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            });

        Ok(Self {
            buffer,
            width: image.width(),
            height: image.height(),
        })
    }

    pub fn new_empty(ctx: &Gpu, width: u32, height: u32) -> Result<Self> {
        ctx.check_samples_size(width, height)?;

        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_samples_buffer"),
            size: Self::byte_len(width, height),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            buffer,
            width,
            height,
        })
    }

    /// Downloads the buffer, blocking until every queued write to it has finished.
    pub fn to_image(&self, ctx: &Gpu) -> Result<GrayImage> {
        let size = Self::byte_len(self.width, self.height);

        let staging_buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_samples_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gpu_samples_download_encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, size);
        ctx.queue().submit(std::iter::once(encoder.finish()));

        let bytes = ctx.read_staging(&staging_buffer)?;
        let samples = super::samples_from_bytes(&bytes);

        GrayImage::new_with_data(self.width, self.height, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn byte_len(width: u32, height: u32) -> u64 {
        width as u64 * height as u64 * std::mem::size_of::<f32>() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::test_gpu;

    #[test]
    fn test_upload_download() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let image = GrayImage::from_fn(37, 5, |x, y| x as f32 * 0.25 - y as f32);
        let gpu_samples = GpuSamples::from_image(&ctx, &image).unwrap();

        let result = gpu_samples.to_image(&ctx).unwrap();

        assert_eq!(result, image);
    }
}
