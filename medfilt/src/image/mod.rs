mod io;

#[cfg(test)]
mod tests;

use std::path::Path;

use crate::common::{Error, Result};

/// Row-major grayscale image with one `f32` sample per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl GrayImage {
    pub fn new_with_data(width: u32, height: u32, samples: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(Error::SizeMismatch(format!(
                "{}x{} image needs {} samples, got {}",
                width,
                height,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn new_filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width as usize * height as usize],
        }
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }

        Self {
            width,
            height,
            samples,
        }
    }

    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        io::load_gray(path)
    }

    /// Writes the image as binary 8-bit PGM, mapping `[0, 1]` to `[0, 255]`.
    pub fn save_pgm<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::save_pgm(self, path)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.samples[x as usize + self.width as usize * y as usize]
    }

    /// Size of the sample buffer in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.samples.len() * std::mem::size_of::<f32>()
    }

    pub(crate) fn same_shape(&self, other: &GrayImage) -> bool {
        self.width == other.width && self.height == other.height
    }
}
