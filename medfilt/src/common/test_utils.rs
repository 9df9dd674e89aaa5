use rand::prelude::*;

use crate::gpu::Gpu;
use crate::image::GrayImage;

/// Returns a GPU context, or `None` (with a note on stderr) on machines without an adapter.
pub fn test_gpu() -> Option<Gpu> {
    match Gpu::new() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping test - no GPU available: {}", e);
            None
        }
    }
}

/// Alternating 0.0 / 1.0 pattern with 0.0 at the origin.
pub fn checkerboard(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| ((x + y) % 2) as f32)
}

/// Uniform noise in `[0, 1)`, reproducible for a given seed.
pub fn random_image(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(width, height, |_, _| rng.random_range(0.0f32..1.0))
}
