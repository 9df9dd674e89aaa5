mod dispatch_timer;
mod gpu_samples;
mod gpu_surface;

use std::sync::Arc;
use std::time::{Duration, Instant};

pub use self::gpu_samples::GpuSamples;
pub use self::gpu_surface::GpuSurface;
pub(crate) use self::gpu_surface::SURFACE_FORMAT;

use self::dispatch_timer::DispatchTimer;
use crate::common::{Error, Result};
use crate::extent::TileShape;

/// GPU context holding wgpu device and queue for compute operations.
#[derive(Debug, Clone)]
pub struct Gpu {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    adapter_info: wgpu::AdapterInfo,
}

impl Gpu {
    /// Creates a new GPU context on the highest-performance adapter.
    ///
    /// The device is requested with the adapter's own limits so large work-groups
    /// (32x32 tiles) are available wherever the hardware supports them.
    /// Timestamp queries are enabled when the adapter has them.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| {
            Error::BackendUnavailable(format!("failed to find suitable GPU adapter: {}", e))
        })?;

        let adapter_info = adapter.get_info();
        log::debug!(
            "Using adapter '{}' ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("medfilt_device"),
            required_features: adapter.features() & wgpu::Features::TIMESTAMP_QUERY,
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .map_err(|e| Error::BackendUnavailable(format!("failed to create device: {}", e)))?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Returns a reference to the wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Blocks until all submitted work has completed.
    pub fn wait(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| Error::Gpu(e.to_string()))
    }

    /// Checks that one tile fits into a single work-group on this device.
    pub fn check_tile(&self, tile: TileShape) -> Result<()> {
        tile.validate()?;

        let limits = self.device.limits();
        if tile.width > limits.max_compute_workgroup_size_x
            || tile.height > limits.max_compute_workgroup_size_y
            || tile.invocations() > limits.max_compute_invocations_per_workgroup
        {
            return Err(Error::UnsupportedTile(format!(
                "{}x{} tile exceeds device limits ({}x{}, {} invocations)",
                tile.width,
                tile.height,
                limits.max_compute_workgroup_size_x,
                limits.max_compute_workgroup_size_y,
                limits.max_compute_invocations_per_workgroup
            )));
        }

        Ok(())
    }

    /// Checks that a `width x height` image can be filtered on this device with `tile`.
    ///
    /// Covers the texture edge limit, the storage buffer and staging buffer sizes and
    /// the work-group grid, so no oversized resource or dispatch reaches wgpu.
    pub fn check_extent(&self, width: u32, height: u32, tile: TileShape) -> Result<()> {
        self.check_tile(tile)?;
        self.check_samples_size(width, height)?;
        self.check_surface_size(width, height)?;

        let max_groups = self.device.limits().max_compute_workgroups_per_dimension;
        let groups = (width.div_ceil(tile.width), height.div_ceil(tile.height));
        if groups.0 > max_groups || groups.1 > max_groups {
            return Err(Error::UnsupportedExtent(format!(
                "{}x{} image needs {}x{} work-groups, device allows {} per dimension",
                width, height, groups.0, groups.1, max_groups
            )));
        }

        Ok(())
    }

    /// Checks that a linear `f32` buffer of `width x height` samples can be bound as storage.
    pub(crate) fn check_samples_size(&self, width: u32, height: u32) -> Result<()> {
        let limits = self.device.limits();
        let size = width as u64 * height as u64 * std::mem::size_of::<f32>() as u64;
        let max = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
        if size > max {
            return Err(Error::UnsupportedExtent(format!(
                "{}x{} samples take {} bytes, device storage buffers hold at most {}",
                width, height, size, max
            )));
        }

        Ok(())
    }

    /// Checks that an `R32Float` surface of `width x height` and its readback buffer fit.
    pub(crate) fn check_surface_size(&self, width: u32, height: u32) -> Result<()> {
        let limits = self.device.limits();
        let max_dim = limits.max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max_dim || height > max_dim {
            return Err(Error::UnsupportedExtent(format!(
                "{}x{} surface, device textures must be 1..={} per side",
                width, height, max_dim
            )));
        }

        let staging = gpu_surface::padded_row_bytes(width) as u64 * height as u64;
        if staging > limits.max_buffer_size {
            return Err(Error::UnsupportedExtent(format!(
                "{}x{} surface needs a {} byte readback buffer, device allows {}",
                width, height, staging, limits.max_buffer_size
            )));
        }

        Ok(())
    }

    /// Records one compute pass, submits it and blocks until it has finished.
    ///
    /// Returns the pass duration from GPU timestamps when the device supports them,
    /// otherwise the host time from submission to the completion barrier. Work queued
    /// earlier (such as texture uploads) is flushed before timing starts.
    pub(crate) fn dispatch(
        &self,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        groups: (u32, u32),
    ) -> Result<Duration> {
        let timer = DispatchTimer::new(self);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: timer.as_ref().map(DispatchTimer::timestamp_writes),
            });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, bind_group, &[]);
            compute_pass.dispatch_workgroups(groups.0, groups.1, 1);
        }

        if let Some(timer) = &timer {
            timer.resolve(&mut encoder);
        }

        self.queue.submit(std::iter::empty());
        self.wait()?;

        let start = Instant::now();
        self.queue.submit(std::iter::once(encoder.finish()));
        self.wait()?;
        let wall_clock = start.elapsed();

        let device_time = match &timer {
            Some(timer) => timer.read(self)?,
            None => None,
        };

        Ok(device_time.unwrap_or(wall_clock))
    }

    /// Maps `staging` for reading once the queue has drained and returns its bytes.
    pub(crate) fn read_staging(&self, staging: &wgpu::Buffer) -> Result<Vec<u8>> {
        let (sender, receiver) = std::sync::mpsc::channel();
        let buffer_slice = staging.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.wait()?;

        receiver
            .recv()
            .map_err(|e| Error::Gpu(e.to_string()))?
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let bytes = data.to_vec();
        drop(data);
        staging.unmap();

        Ok(bytes)
    }
}

pub(crate) fn samples_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(bytemuck::pod_read_unaligned::<f32>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::test_gpu;

    #[test]
    fn test_gpu_context_creation() {
        let result = Gpu::new();
        if let Err(e) = &result {
            eprintln!(
                "GPU context creation failed (expected on headless systems): {}",
                e
            );
            assert!(matches!(e, Error::BackendUnavailable(_)));
        }
    }

    #[test]
    fn test_check_tile_rejects_oversized_tile() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let limits = ctx.device().limits();
        let tile = TileShape {
            width: limits.max_compute_workgroup_size_x + 1,
            height: 1,
        };

        assert!(matches!(ctx.check_tile(tile), Err(Error::UnsupportedTile(_))));
        assert!(ctx.check_tile(TileShape::new(1, 1).unwrap()).is_ok());
    }

    #[test]
    fn test_check_extent_rejects_oversized_image() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let tile = TileShape::new(8, 8).unwrap();
        let max_dim = ctx.device().limits().max_texture_dimension_2d;

        assert!(ctx.check_extent(64, 64, tile).is_ok());
        assert!(matches!(
            ctx.check_extent(max_dim + tile.width, 8, tile),
            Err(Error::UnsupportedExtent(_))
        ));
        assert!(matches!(
            ctx.check_extent(8, max_dim + tile.height, tile),
            Err(Error::UnsupportedExtent(_))
        ));
        assert!(matches!(
            ctx.check_extent(0, 8, tile),
            Err(Error::UnsupportedExtent(_))
        ));
    }

    #[test]
    fn test_check_samples_size_rejects_oversized_buffer() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let limits = ctx.device().limits();
        let max = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
        let width = 1u32 << 16;
        let height = (max / (4 * width as u64) + 1).min(u32::MAX as u64) as u32;

        assert!(matches!(
            ctx.check_samples_size(width, height),
            Err(Error::UnsupportedExtent(_))
        ));
    }
}
