use std::time::Duration;

use super::Gpu;
use crate::common::Result;

const TIMESTAMP_COUNT: u32 = 2;
const TIMESTAMP_BYTES: u64 = TIMESTAMP_COUNT as u64 * wgpu::QUERY_SIZE as u64;

/// Device-side timing of a single compute pass through timestamp queries.
pub(super) struct DispatchTimer {
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
}

impl DispatchTimer {
    /// Returns `None` when the device was created without `TIMESTAMP_QUERY`.
    pub(super) fn new(ctx: &Gpu) -> Option<Self> {
        let device = ctx.device();
        if !device.features().contains(wgpu::Features::TIMESTAMP_QUERY) {
            return None;
        }

        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("dispatch_timer_query_set"),
            ty: wgpu::QueryType::Timestamp,
            count: TIMESTAMP_COUNT,
        });

        let resolve_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dispatch_timer_resolve"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dispatch_timer_staging"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Some(Self {
            query_set,
            resolve_buffer,
            staging_buffer,
        })
    }

    pub(super) fn timestamp_writes(&self) -> wgpu::ComputePassTimestampWrites<'_> {
        wgpu::ComputePassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: Some(0),
            end_of_pass_write_index: Some(1),
        }
    }

    /// Records the copy of both timestamps into the staging buffer.
    pub(super) fn resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.resolve_query_set(&self.query_set, 0..TIMESTAMP_COUNT, &self.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(
            &self.resolve_buffer,
            0,
            &self.staging_buffer,
            0,
            TIMESTAMP_BYTES,
        );
    }

    /// Reads the pass duration back. Call only after the recording submission completed.
    pub(super) fn read(&self, ctx: &Gpu) -> Result<Option<Duration>> {
        let bytes = ctx.read_staging(&self.staging_buffer)?;
        let start = bytemuck::pod_read_unaligned::<u64>(&bytes[0..8]);
        let end = bytemuck::pod_read_unaligned::<u64>(&bytes[8..16]);

        Ok(ticks_to_duration(start, end, ctx.queue().get_timestamp_period()))
    }
}

/// Converts a pair of raw timestamps into a duration.
///
/// `None` for an empty or reversed interval; some drivers report zeros for passes
/// they could not time.
fn ticks_to_duration(start: u64, end: u64, period_ns: f32) -> Option<Duration> {
    if end <= start || period_ns <= 0.0 {
        return None;
    }

    let nanos = (end - start) as f64 * period_ns as f64;
    Some(Duration::from_nanos(nanos.round() as u64))
}
