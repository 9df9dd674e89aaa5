use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// Work-group shape used to grid the image for parallel dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileShape {
    pub width: u32,
    pub height: u32,
}

impl Default for TileShape {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
        }
    }
}

impl TileShape {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let tile = Self { width, height };
        tile.validate()?;
        Ok(tile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidTileShape {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Number of workers in one tile.
    pub fn invocations(&self) -> u32 {
        self.width * self.height
    }
}

/// Largest image extent that is an exact multiple of the tile shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedExtent {
    pub width: u32,
    pub height: u32,
    pub count: usize,
    pub byte_size: usize,
}

impl NormalizedExtent {
    /// Workgroup grid covering the extent.
    pub fn tile_grid(&self, tile: TileShape) -> (u32, u32) {
        (self.width / tile.width, self.height / tile.height)
    }
}

/// Shrinks `raw_width x raw_height` down to whole tiles along both axes.
///
/// Fails with [`Error::DegenerateExtent`] when either axis holds less than one tile.
pub fn normalize(tile: TileShape, raw_width: u32, raw_height: u32) -> Result<NormalizedExtent> {
    tile.validate()?;

    let width = tile.width * (raw_width / tile.width);
    let height = tile.height * (raw_height / tile.height);

    if width == 0 || height == 0 {
        return Err(Error::DegenerateExtent {
            raw_width,
            raw_height,
            tile_width: tile.width,
            tile_height: tile.height,
        });
    }

    let count = width as usize * height as usize;

    Ok(NormalizedExtent {
        width,
        height,
        count,
        byte_size: count * std::mem::size_of::<f32>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rounds_down_to_tiles() {
        let extent = normalize(TileShape::default(), 34, 34).unwrap();

        assert_eq!(extent.width, 32);
        assert_eq!(extent.height, 32);
        assert_eq!(extent.count, 1024);
        assert_eq!(extent.byte_size, 4096);
    }

    #[test]
    fn test_normalize_exact_tile_is_unchanged() {
        let extent = normalize(TileShape::default(), 32, 32).unwrap();

        assert_eq!((extent.width, extent.height), (32, 32));
        assert_eq!(extent.tile_grid(TileShape::default()), (1, 1));
    }

    #[test]
    fn test_normalize_non_square_tile() {
        let tile = TileShape::new(16, 8).unwrap();
        let extent = normalize(tile, 100, 61).unwrap();

        assert_eq!((extent.width, extent.height), (96, 56));
        assert_eq!(extent.tile_grid(tile), (6, 7));
    }

    #[test]
    fn test_normalize_properties() {
        let tiles = [(1, 1), (3, 5), (8, 8), (16, 4), (32, 32)];

        for (tw, th) in tiles {
            let tile = TileShape::new(tw, th).unwrap();
            for w in 0..80 {
                for h in [0, 1, 7, 31, 32, 33, 64, 79] {
                    match normalize(tile, w, h) {
                        Ok(extent) => {
                            assert_eq!(extent.width % tw, 0);
                            assert_eq!(extent.height % th, 0);
                            assert!(extent.width <= w);
                            assert!(extent.height <= h);
                            assert!(w - extent.width < tw);
                            assert!(h - extent.height < th);
                            assert_eq!(extent.count, (extent.width * extent.height) as usize);
                        }
                        Err(Error::DegenerateExtent { .. }) => {
                            assert!(w < tw || h < th, "{}x{} with tile {}x{}", w, h, tw, th);
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            }
        }
    }

    #[test]
    fn test_normalize_degenerate_extent() {
        let tile = TileShape::default();

        for (w, h) in [(31, 64), (64, 31), (0, 0), (1, 1000)] {
            assert!(
                matches!(normalize(tile, w, h), Err(Error::DegenerateExtent { .. })),
                "{}x{} must be degenerate",
                w,
                h
            );
        }
    }

    #[test]
    fn test_zero_tile_is_rejected() {
        assert!(matches!(
            TileShape::new(0, 32),
            Err(Error::InvalidTileShape { .. })
        ));

        let tile = TileShape {
            width: 32,
            height: 0,
        };
        assert!(matches!(
            normalize(tile, 64, 64),
            Err(Error::InvalidTileShape { .. })
        ));
    }
}
