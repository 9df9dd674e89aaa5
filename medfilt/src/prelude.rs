// Error handling
pub use crate::common::{Error, Result};

// Image and tiling
pub use crate::extent::{NormalizedExtent, TileShape, normalize};
pub use crate::image::GrayImage;
pub use crate::tiler::tile;

// Operations
pub use crate::ops::{GpuMedianBufferPipeline, GpuMedianSurfacePipeline, MAX_KERNEL_SIZE, MedianFilter};

// GPU
pub use crate::gpu::{Gpu, GpuSamples, GpuSurface};

// Comparison
pub use crate::bench::{Comparison, FilterPath, PathRun, TiledInput};
pub use crate::config::BenchConfig;
