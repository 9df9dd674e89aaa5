use crate::common::{Error, Result};
use crate::extent::NormalizedExtent;
use crate::image::GrayImage;

/// Resamples `raw` onto `extent` with periodic addressing.
///
/// `out[i + w * j] = raw[(i % raw_w) + raw_w * (j % raw_h)]`, so a source smaller
/// than the extent is repeated rather than padded.
pub fn tile(raw: &GrayImage, extent: &NormalizedExtent) -> Result<GrayImage> {
    if raw.is_empty() {
        return Err(Error::DegenerateExtent {
            raw_width: raw.width(),
            raw_height: raw.height(),
            tile_width: extent.width,
            tile_height: extent.height,
        });
    }

    let raw_width = raw.width() as usize;
    let raw_height = raw.height() as usize;
    let src = raw.samples();

    let mut samples = Vec::with_capacity(extent.count);
    for j in 0..extent.height as usize {
        let src_row = &src[raw_width * (j % raw_height)..][..raw_width];
        samples.extend((0..extent.width as usize).map(|i| src_row[i % raw_width]));
    }

    GrayImage::new_with_data(extent.width, extent.height, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::{TileShape, normalize};

    #[test]
    fn test_tile_crops_larger_image() {
        let raw = GrayImage::from_fn(34, 34, |x, y| (x * 100 + y) as f32);
        let extent = normalize(TileShape::default(), 34, 34).unwrap();

        let tiled = tile(&raw, &extent).unwrap();

        assert_eq!((tiled.width(), tiled.height()), (32, 32));
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(tiled.get(x, y), raw.get(x, y));
            }
        }
    }

    #[test]
    fn test_tile_is_periodic() {
        let raw = GrayImage::from_fn(5, 3, |x, y| (x + 7 * y) as f32);
        let extent = NormalizedExtent {
            width: 16,
            height: 8,
            count: 128,
            byte_size: 512,
        };

        let tiled = tile(&raw, &extent).unwrap();

        for j in 0..8 {
            for i in 0..16 {
                assert_eq!(
                    tiled.get(i, j),
                    raw.get(i % 5, j % 3),
                    "mismatch at ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_tile_constant_image_stays_constant() {
        let raw = GrayImage::new_filled(34, 34, 1.0);
        let extent = normalize(TileShape::default(), 34, 34).unwrap();

        let tiled = tile(&raw, &extent).unwrap();

        assert_eq!(tiled.len(), extent.count);
        assert!(tiled.samples().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_tile_empty_source_fails() {
        let raw = GrayImage::new_filled(0, 0, 0.0);
        let extent = NormalizedExtent {
            width: 32,
            height: 32,
            count: 1024,
            byte_size: 4096,
        };

        assert!(matches!(
            tile(&raw, &extent),
            Err(Error::DegenerateExtent { .. })
        ));
    }
}
