mod median;

pub(crate) use median::validate_kernel_size;
pub use median::{GpuMedianBufferPipeline, GpuMedianSurfacePipeline, MAX_KERNEL_SIZE, MedianFilter};
